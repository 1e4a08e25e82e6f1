// Copyright @yucwang 2021

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::integrator::Integrator;
use crate::core::rng::{LcgRng, Sampler};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

pub use super::renderer::Renderer;

const BLOCK_SIZE: usize = 128;

/// Renders the scene sensor in square blocks handed out to a scoped thread
/// pool. Every pixel owns an `LcgRng` stream seeded from the render seed
/// and its coordinates, so images do not depend on the thread count.
pub struct SimpleRenderer {
    id: String,
    integrator: Arc<dyn Integrator>,
    spp: u32,
    seed: u64,
    threads: Option<usize>,
}

impl ComputationNode for SimpleRenderer {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("SimpleRenderer[integrator = {}, spp = {}, seed = {}]",
                self.integrator.to_string(), self.spp, self.seed)
    }
}

impl SimpleRenderer {
    pub fn new(integrator: Arc<dyn Integrator>, spp: u32, seed: u64) -> Self {
        Self {
            id: generate_node_id("SimpleRenderer"),
            integrator,
            spp: spp.max(1),
            seed,
            threads: None,
        }
    }

    /// `None` uses all available cores.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&n| n > 0);
        self
    }

    /// Mean of `spp` estimates for pixel `(x, y)`. Non-finite estimates
    /// count as zero.
    pub fn render_pixel(&self, scene: &Scene, sensor: &dyn Sensor, x: usize, y: usize) -> RGBSpectrum {
        let mut rng = LcgRng::for_pixel(self.seed, x, y);
        let mut sum = RGBSpectrum::zero();
        for _ in 0..self.spp {
            let pixel = Vector2f::new(x as Float + rng.next_1d(), y as Float + rng.next_1d());
            let ray = sensor.sample_ray(&pixel);
            let li = self.integrator.li(scene, &ray, &mut rng);
            if li.is_finite() {
                sum += li;
            }
        }
        sum / self.spp as Float
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &Scene) -> Bitmap {
        let sensor = match scene.sensor() {
            Some(sensor) => sensor.as_ref(),
            None => {
                log::warn!("Scene has no sensor, nothing to render.");
                return Bitmap::new(0, 0);
            }
        };
        let (width, height) = sensor.resolution();
        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let total_blocks = blocks_x * blocks_y;

        let thread_count = self.threads.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        log::info!("Rendering {}x{} at {} spp with {} threads: {}.",
                   width, height, self.spp, thread_count, self.integrator.to_string());
        let start = Instant::now();

        let progress = ProgressBar::new(total_blocks as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, usize, usize, usize, Vec<RGBSpectrum>)>();
        let mut bitmap = Bitmap::new(width, height);

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_block = &next_block;
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                        if block_index >= total_blocks {
                            break;
                        }

                        let x0 = (block_index % blocks_x) * BLOCK_SIZE;
                        let y0 = (block_index / blocks_x) * BLOCK_SIZE;
                        let x1 = (x0 + BLOCK_SIZE).min(width);
                        let y1 = (y0 + BLOCK_SIZE).min(height);

                        let mut block = Vec::with_capacity((x1 - x0) * (y1 - y0));
                        for y in y0..y1 {
                            for x in x0..x1 {
                                block.push(self.render_pixel(scene, sensor, x, y));
                            }
                        }
                        if tx.send((x0, y0, x1, y1, block)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for (x0, y0, x1, y1, block) in rx.iter() {
                for y in y0..y1 {
                    for x in x0..x1 {
                        bitmap[(x, y)] = block[(x - x0) + (x1 - x0) * (y - y0)];
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();
        log::info!("Rendering finished in {:.2?}.", start.elapsed());
        bitmap
    }
}
