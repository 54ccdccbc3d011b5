// Host-side tests for field activation: clamping, monotone convergence and
// the dormant skip.

use backdrop_core::fields::{Breather, ModelField, PolygonField, Starfield, Wavefield};
use backdrop_core::*;
use glam::Vec3;

fn input(elapsed: f32, delta: f32, key: ActiveKey) -> FrameInput {
    FrameInput {
        elapsed,
        delta,
        key,
        camera_eye: Vec3::new(0.0, 0.0, 25.0),
    }
}

fn small_fields(table: &ActivationTable) -> Vec<Box<dyn Field>> {
    vec![
        Box::new(Starfield::with_count(table.trigger(FieldId::Starfield), 32, 1)),
        Box::new(Breather::with_count(table.trigger(FieldId::Breather), 32, 2)),
        Box::new(Wavefield::with_grid(table.trigger(FieldId::Wavefield), 8, 4, 3)),
        Box::new(PolygonField::with_count(table.trigger(FieldId::Polygons), 3, 4)),
        Box::new(ModelField::with_count(table.trigger(FieldId::Models), 6, 5)),
        Box::new(PosterField::with_config(
            table.trigger(FieldId::Posters),
            &PosterConfig {
                texture_count: 4,
                total_images: 8,
                ..PosterConfig::default()
            },
            6,
        )),
    ]
}

/// A key that turns the given field on.
fn live_key(field: FieldId) -> ActiveKey {
    match field {
        FieldId::Starfield => None,
        FieldId::Breather => Some(ProjectKey::MentalReset),
        FieldId::Wavefield => Some(ProjectKey::VoxNl),
        FieldId::Polygons => Some(ProjectKey::TrailShade),
        FieldId::Models => Some(ProjectKey::UnlinkNl),
        FieldId::Posters => Some(ProjectKey::MovieBot),
        FieldId::Choreography => Some(ProjectKey::NailSalon),
    }
}

/// A key that turns the given field off.
fn idle_key(field: FieldId) -> ActiveKey {
    match field {
        FieldId::Starfield => Some(ProjectKey::NailSalon),
        _ => Some(ProjectKey::YoutubeDm),
    }
}

#[test]
fn activation_is_clamped_and_monotone_while_rising() {
    let table = ActivationTable::default();
    for mut field in small_fields(&table) {
        let key = live_key(field.id());
        let mut prev = field.activation().current();
        for frame in 0..240 {
            field.step(&input(frame as f32 / 60.0, 1.0 / 60.0, key));
            let cur = field.activation().current();
            assert!((0.0..=1.0).contains(&cur), "{:?}: {cur} out of range", field.id());
            assert!(cur >= prev, "{:?}: fell from {prev} to {cur}", field.id());
            prev = cur;
        }
        assert!(prev > 0.99, "{:?} only reached {prev}", field.id());
    }
}

#[test]
fn activation_is_clamped_and_monotone_while_falling() {
    let table = ActivationTable::default();
    for mut field in small_fields(&table) {
        let id = field.id();
        for frame in 0..120 {
            field.step(&input(frame as f32 / 60.0, 1.0 / 60.0, live_key(id)));
        }
        let mut prev = field.activation().current();
        for frame in 0..240 {
            field.step(&input(2.0 + frame as f32 / 60.0, 1.0 / 60.0, idle_key(id)));
            let cur = field.activation().current();
            assert!((0.0..=1.0).contains(&cur));
            assert!(cur <= prev, "{id:?}: rose from {prev} to {cur}");
            prev = cur;
        }
    }
}

#[test]
fn non_matching_key_fades_every_field_out() {
    let table = ActivationTable::default();
    for mut field in small_fields(&table) {
        let id = field.id();
        for frame in 0..60 {
            field.step(&input(frame as f32 / 60.0, 1.0 / 60.0, live_key(id)));
        }
        assert!(field.visible());
        for frame in 0..300 {
            field.step(&input(1.0 + frame as f32 / 60.0, 1.0 / 60.0, idle_key(id)));
        }
        assert!(
            field.activation().current() < 0.01,
            "{id:?} still at {}",
            field.activation().current()
        );
        assert!(!field.visible());
    }
}

#[test]
fn huge_delta_lands_on_target_without_overshoot() {
    let mut a = Activation::new(0.5, 5.0, 0.85);
    a.step(true, 10.0);
    assert_eq!(a.current(), 1.0);
    a.step(false, 10.0);
    assert_eq!(a.current(), 0.0);
    // Negative deltas are treated as a stalled frame.
    a.step(true, -1.0);
    assert_eq!(a.current(), 0.0);
}

#[test]
fn opacity_scales_by_peak() {
    let a = Activation::new(0.5, 5.0, 0.85);
    assert!((a.opacity() - 0.425).abs() < 1e-6);
}

#[test]
fn dormant_field_skips_element_update() {
    let table = ActivationTable::default();
    let mut breather = Breather::with_count(table.trigger(FieldId::Breather), 16, 9);
    assert!(breather.buffers_mut().take_dirty());
    breather.step(&input(0.5, 1.0 / 60.0, None));
    assert!(breather.activation().dormant());
    assert!(!breather.buffers().is_dirty());

    breather.step(&input(0.6, 1.0 / 60.0, Some(ProjectKey::MentalReset)));
    assert!(breather.buffers().is_dirty());
}

#[test]
fn empty_field_still_completes_its_fade() {
    let table = ActivationTable::default();
    let mut stars = Starfield::with_count(table.trigger(FieldId::Starfield), 0, 1);
    assert!(stars.buffers().is_empty());
    assert!(stars.visible());
    for frame in 0..300 {
        stars.step(&input(frame as f32 / 60.0, 1.0 / 60.0, Some(ProjectKey::VoxNl)));
    }
    assert!(!stars.visible());
}

#[test]
fn buffer_lengths_never_change() {
    let table = ActivationTable::default();
    let mut wave = Wavefield::with_grid(table.trigger(FieldId::Wavefield), 10, 5, 2);
    let mut poly = PolygonField::with_count(table.trigger(FieldId::Polygons), 4, 2);
    let (wl, pl) = (wave.buffers().len(), poly.buffers().len());
    assert_eq!(wl, 50);
    for frame in 0..30 {
        let key = if frame % 2 == 0 {
            Some(ProjectKey::VoxNl)
        } else {
            Some(ProjectKey::TrailShade)
        };
        wave.step(&input(frame as f32 * 0.1, 0.1, key));
        poly.step(&input(frame as f32 * 0.1, 0.1, key));
    }
    assert_eq!(wave.buffers().len(), wl);
    assert_eq!(poly.buffers().len(), pl);
    assert_eq!(wave.buffers().colors.len(), wl);
}

#[test]
fn polygon_indices_stay_in_bounds() {
    let table = ActivationTable::default();
    let poly = PolygonField::with_count(table.trigger(FieldId::Polygons), 12, 8);
    let n = poly.buffers().len() as u32;
    assert!(poly.triangles().iter().all(|&i| i < n));
    assert!(poly.outline().iter().all(|&i| i < n));
    for p in poly.polygons() {
        assert!((4..18).contains(&p.len), "polygon with {} vertices", p.len);
    }
    assert_eq!(poly.triangles().len() % 3, 0);
    assert_eq!(poly.outline().len() % 2, 0);
}

#[test]
fn model_scale_follows_activation() {
    let table = ActivationTable::default();
    let mut models = ModelField::with_count(table.trigger(FieldId::Models), 12, 3);
    assert_eq!(models.instance_scale(0), 0.0);
    for frame in 0..240 {
        models.step(&input(frame as f32 / 60.0, 1.0 / 60.0, Some(ProjectKey::UnlinkNl)));
    }
    for (i, inst) in models.instances().iter().enumerate() {
        let s = models.instance_scale(i);
        assert!((s - inst.kind.base_scale()).abs() <= inst.kind.base_scale() * 0.01);
    }
    assert_eq!(models.transforms().len(), 12);
}

#[test]
fn model_billboards_carry_each_instance_spin() {
    let table = ActivationTable::default();
    let mut models = ModelField::with_count(table.trigger(FieldId::Models), 12, 3);
    let key = Some(ProjectKey::UnlinkNl);
    for frame in 0..120 {
        models.step(&input(frame as f32 / 60.0, 1.0 / 60.0, key));
    }
    let before: Vec<Billboard> = models.transforms().iter().map(Billboard::from_transform).collect();
    for (b, inst) in before.iter().zip(models.instances()) {
        let r = inst.rotation;
        let q = glam::Quat::from_euler(glam::EulerRot::XYZ, r.x, r.y, r.z);
        assert!((b.right - q * Vec3::X).length() < 1e-4, "{:?} lost its rotation", inst.kind);
        assert!((b.up - q * Vec3::Y).length() < 1e-4);
        assert!((b.center - inst.position).length() < 1e-4);
    }

    for frame in 120..720 {
        models.step(&input(frame as f32 / 60.0, 1.0 / 60.0, key));
    }
    let turned = models
        .transforms()
        .iter()
        .map(Billboard::from_transform)
        .zip(&before)
        .filter(|(after, b)| after.right.dot(b.right) < 0.99)
        .count();
    assert!(turned > 0, "no instance spun on screen");

    let dormant = ModelField::with_count(table.trigger(FieldId::Models), 2, 3);
    let b = Billboard::from_transform(&dormant.transforms()[0]);
    assert_eq!((b.size, b.right, b.up), (0.0, Vec3::ZERO, Vec3::ZERO));
}

#[test]
fn activation_table_routes_keys() {
    let table = ActivationTable::default();
    assert!(table.is_live(FieldId::Starfield, None));
    assert!(table.is_live(FieldId::Starfield, Some(ProjectKey::YoutubeDm)));
    assert!(table.is_live(FieldId::Starfield, Some(ProjectKey::TrailShade)));
    assert!(!table.is_live(FieldId::Starfield, Some(ProjectKey::MovieBot)));
    for field in FieldId::ALL.into_iter().filter(|f| *f != FieldId::Starfield) {
        assert!(!table.is_live(field, None), "{field:?} live without a key");
    }

    // Unknown host ids are inactive everywhere except the default starfield.
    assert_eq!(active_key_from_host(Some("blog")), None);
    assert_eq!(active_key_from_host(Some("voxnl")), Some(ProjectKey::VoxNl));

    let custom = table.with_trigger(FieldId::Breather, Trigger::ShowOn(KeySet::EMPTY));
    assert!(!custom.is_live(FieldId::Breather, Some(ProjectKey::MentalReset)));
}
