// Copyright @yucwang 2026

use std::path::Path;

use brume::core::scene_loader::{load_scene, load_scene_from_str, SceneDescription};
use brume::math::constants::Vector3f;
use brume::math::spectrum::RGBSpectrum;
use brume::renderers::simple::{Renderer, SimpleRenderer};

fn scene(integrator: &str, camera: &str, body: &str) -> SceneDescription {
    let xml = format!(r#"<?xml version="1.0"?>
        <scene version="0.6.0">
            {}
            <sensor type="perspective">
                <float name="fov" value="40"/>
                <transform name="to_world">{}</transform>
                <film type="hdrfilm">
                    <integer name="width" value="32"/>
                    <integer name="height" value="24"/>
                </film>
            </sensor>
            {}
        </scene>"#, integrator, camera, body);
    load_scene_from_str(&xml, Path::new(".")).expect("test scene should load")
}

fn pixel(desc: &SceneDescription, spp: u32, seed: u64, x: usize, y: usize) -> RGBSpectrum {
    let sensor = desc.scene.sensor().expect("scene has a sensor");
    SimpleRenderer::new(desc.integrator.clone(), spp, seed).render_pixel(&desc.scene, sensor.as_ref(), x, y)
}

fn close(a: RGBSpectrum, b: RGBSpectrum, tol: f32) -> bool {
    (a.to_vector() - b.to_vector()).norm() <= tol
}

const FRONT_CAMERA: &str = r#"<lookat origin="0, 0, 5" target="0, 0, 0" up="0, 1, 0"/>"#;

#[test]
fn emissive_quad_seen_directly() {
    let body = r#"
        <shape type="rectangle">
            <transform name="to_world"><scale value="3"/></transform>
            <emitter type="area"><rgb name="radiance" value="1, 2, 3"/></emitter>
        </shape>"#;
    let radiance = RGBSpectrum::new(1.0, 2.0, 3.0);
    for name in &["direct_ems", "direct_mats", "direct_mis"] {
        let desc = scene(&format!(r#"<integrator type="{}"/>"#, name), FRONT_CAMERA, body);
        for &(x, y) in &[(0, 0), (16, 12), (31, 23), (5, 20)] {
            let value = pixel(&desc, 4, 1, x, y);
            assert!(close(value, radiance, 1e-5), "{} at ({}, {}) gave {:?}", name, x, y, value.to_vector());
        }
    }
}

fn shadowed_sphere(integrator: &str, occluded: bool) -> SceneDescription {
    let occluder = r#"
        <shape type="cube">
            <transform name="to_world">
                <scale x="1" y="0.1" z="1"/>
                <translate x="0" y="2.5" z="3"/>
            </transform>
        </shape>"#;
    let body = format!(r#"
        <shape type="sphere">
            <float name="radius" value="1"/>
            <bsdf type="diffuse"><rgb name="reflectance" value="0.7"/></bsdf>
        </shape>
        <emitter type="point">
            <point name="position" value="0, 5, 5"/>
            <rgb name="intensity" value="40"/>
        </emitter>
        {}"#, if occluded { occluder } else { "" });
    scene(integrator, FRONT_CAMERA, &body)
}

#[test]
fn blocked_point_light_gives_no_direct_light() {
    let lit = shadowed_sphere(r#"<integrator type="direct_ems"/>"#, false);
    assert!(pixel(&lit, 4, 3, 16, 12).max_value() > 0.0);

    for integrator in &[r#"<integrator type="direct_ems"/>"#,
                        r#"<integrator type="direct_mis"/>"#,
                        r#"<integrator type="path_nee"><integer name="maxDepth" value="4"/></integrator>"#] {
        let desc = shadowed_sphere(integrator, true);
        for &(x, y) in &[(16, 12), (15, 11), (17, 13)] {
            assert_eq!(pixel(&desc, 8, 3, x, y), RGBSpectrum::zero(), "{}", integrator);
        }
    }
}

fn lit_room(integrator: &str, medium: &str) -> SceneDescription {
    let body = format!(r#"
        <shape type="rectangle">
            <transform name="to_world">
                <scale value="3"/>
                <rotate x="1" angle="-90"/>
            </transform>
            <bsdf type="diffuse"><rgb name="reflectance" value="0.5"/></bsdf>
        </shape>
        <shape type="sphere">
            <point name="center" value="0, 0.5, 0"/>
            <float name="radius" value="0.5"/>
            <bsdf type="roughconductor"><float name="alpha" value="0.3"/></bsdf>
        </shape>
        <shape type="rectangle">
            <transform name="to_world">
                <scale value="0.5"/>
                <rotate x="1" angle="90"/>
                <translate y="2"/>
            </transform>
            <emitter type="area"><rgb name="radiance" value="10"/></emitter>
        </shape>
        {}"#, medium);
    scene(integrator, r#"<lookat origin="0, 1, 4" target="0, 0.5, 0" up="0, 1, 0"/>"#, &body)
}

#[test]
fn vacuum_medium_changes_nothing() {
    let vacuum = r#"
        <medium type="homogeneous">
            <rgb name="sigma_a" value="0"/>
            <rgb name="sigma_s" value="0"/>
        </medium>"#;
    let vol = lit_room(r#"<integrator type="vol_path"/>"#, vacuum);
    let surface = lit_room(r#"<integrator type="path_mis"/>"#, "");

    let medium = vol.scene.medium().expect("scene has a medium");
    assert_eq!(medium.transmittance(&Vector3f::zeros(), &Vector3f::new(3.0, 4.0, 0.0)),
               RGBSpectrum::splat(1.0));

    for &(x, y) in &[(16, 12), (3, 20), (28, 4), (10, 18)] {
        let a = pixel(&vol, 16, 11, x, y);
        let b = pixel(&surface, 16, 11, x, y);
        assert!(close(a, b, 1e-4 * (1.0 + b.max_value())),
                "({}, {}): {:?} vs {:?}", x, y, a.to_vector(), b.to_vector());
    }
}

#[test]
fn mis_and_nee_agree_without_roulette() {
    let settings = r#"<integer name="maxDepth" value="3"/><boolean name="rr" value="false"/>"#;
    let mis = lit_room(&format!(r#"<integrator type="path_mis">{}</integrator>"#, settings), "");
    let nee = lit_room(&format!(r#"<integrator type="path_nee">{}</integrator>"#, settings), "");

    let render = |desc: &SceneDescription, seed: u64| {
        SimpleRenderer::new(desc.integrator.clone(), 64, seed)
            .with_threads(Some(2))
            .render(&desc.scene)
            .mean()
    };
    let a = render(&mis, 5);
    let b = render(&nee, 6);
    assert!(b.max_value() > 0.0);
    for (x, y) in a.to_vector().iter().zip(b.to_vector().iter()) {
        assert!((x - y).abs() <= 0.05 * y, "path_mis {} vs path_nee {}", x, y);
    }
}

#[test]
fn scene_files_resolve_meshes_next_to_them() {
    let dir = std::env::temp_dir().join("brume_scene_file");
    std::fs::create_dir_all(dir.join("meshes")).expect("temp dir is writable");
    std::fs::write(dir.join("meshes/quad.obj"), "\
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
f 1 2 3
f 1 3 4
").expect("temp dir is writable");
    std::fs::write(dir.join("scene.xml"), r#"
        <scene version="0.6.0">
            <default name="mesh" value="quad"/>
            <integrator type="direct_mis"/>
            <sensor type="perspective">
                <transform name="to_world">
                    <lookat origin="0, 0, 5" target="0, 0, 0" up="0, 1, 0"/>
                </transform>
                <sampler type="independent"><integer name="sampleCount" value="2"/></sampler>
                <film type="hdrfilm">
                    <integer name="width" value="8"/>
                    <integer name="height" value="8"/>
                </film>
            </sensor>
            <shape type="obj">
                <string name="filename" value="meshes/$mesh.obj"/>
                <transform name="to_world"><scale value="4"/></transform>
                <emitter type="area"><rgb name="radiance" value="2"/></emitter>
            </shape>
        </scene>"#).expect("temp dir is writable");

    let desc = load_scene(dir.join("scene.xml")).expect("scene file should load");
    assert_eq!(desc.spp, 2);
    let image = SimpleRenderer::new(desc.integrator.clone(), desc.spp, 0).render(&desc.scene);
    assert_eq!((image.width(), image.height()), (8, 8));
    assert!(close(image.mean(), RGBSpectrum::splat(2.0), 1e-4));

    let _ = std::fs::remove_dir_all(&dir);
}

fn image_mean(desc: &SceneDescription, spp: u32, seed: u64) -> RGBSpectrum {
    SimpleRenderer::new(desc.integrator.clone(), spp, seed)
        .with_threads(Some(2))
        .render(&desc.scene)
        .mean()
}

fn within(a: RGBSpectrum, b: RGBSpectrum, rel: f32) -> bool {
    a.to_vector().iter().zip(b.to_vector().iter()).all(|(x, y)| (x - y).abs() <= rel * y.abs())
}

const FOG_BOX: &str = r#"<shape type="cube"><transform name="to_world"><scale value="1.8"/></transform></shape>"#;

#[test]
fn absorbing_slab_dims_an_emitter() {
    // A slab of pure absorber, one unit thick, between the camera and a quad light.
    let body = r#"
        <shape type="rectangle">
            <transform name="to_world"><scale value="3"/></transform>
            <emitter type="area"><rgb name="radiance" value="1, 2, 3"/></emitter>
        </shape>
        <medium type="homogeneous">
            <rgb name="sigma_a" value="0.5"/>
            <rgb name="sigma_s" value="0"/>
            <shape type="cube">
                <transform name="to_world">
                    <scale x="4" y="4" z="0.5"/>
                    <translate z="2"/>
                </transform>
            </shape>
        </medium>"#;
    let desc = scene(r#"<integrator type="vol_path"/>"#, FRONT_CAMERA, body);

    let expected = RGBSpectrum::new(1.0, 2.0, 3.0) * (-0.5f32).exp();
    let value = pixel(&desc, 16384, 2, 16, 12);
    assert!(within(value, expected, 0.03), "{:?} vs {:?}", value.to_vector(), expected.to_vector());
}

#[test]
fn single_scattering_matches_one_bounce_volumetric_paths() {
    let fog = format!(r#"
        <medium type="homogeneous">
            <rgb name="sigma_a" value="0.1"/>
            <rgb name="sigma_s" value="0.4"/>
            {}
        </medium>"#, FOG_BOX);
    let single = lit_room(r#"<integrator type="single_scat"/>"#, &fog);
    let vol = lit_room(r#"<integrator type="vol_path"><integer name="maxDepth" value="1"/></integrator>"#, &fog);

    let a = image_mean(&single, 64, 21);
    let b = image_mean(&vol, 64, 22);
    assert!(b.max_value() > 0.0);
    assert!(within(a, b, 0.05), "single_scat {:?} vs vol_path {:?}", a.to_vector(), b.to_vector());
}

#[test]
fn constant_heterogeneous_fog_matches_homogeneous() {
    let homogeneous = format!(r#"
        <medium type="homogeneous">
            <rgb name="sigma_a" value="0.1"/>
            <rgb name="sigma_s" value="0.4"/>
            {}
        </medium>"#, FOG_BOX);
    let heterogeneous = format!(r#"
        <medium type="heterogeneous">
            <volume type="constvolume" name="density"><float name="value" value="0.5"/></volume>
            <rgb name="albedo" value="0.8"/>
            {}
        </medium>"#, FOG_BOX);
    let integrator = r#"<integrator type="vol_path"><integer name="maxDepth" value="4"/></integrator>"#;
    let a = image_mean(&lit_room(integrator, &homogeneous), 64, 31);
    let b = image_mean(&lit_room(integrator, &heterogeneous), 64, 32);
    assert!(b.max_value() > 0.0);
    assert!(within(a, b, 0.05), "homogeneous {:?} vs heterogeneous {:?}", a.to_vector(), b.to_vector());
}
