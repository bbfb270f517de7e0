//! Capture reader behaviour over synthetic buffers.

mod common;

use common::*;
use spatial_capture::prelude::*;

const SKELETON_ONLY: CaptureLayout = CaptureLayout { user_anchors: false, skeleton: true, camera: false };

#[test]
fn scenario_a_two_skeleton_frames_then_halt() {
    let data = CaptureBuilder::new()
        .header(202005, 2, 1)
        .skeleton(&["root"], &[-1])
        .skeleton_frame(&[translation(1.0, 0.0, 0.0)])
        .skeleton_frame(&[translation(2.0, 0.0, 0.0)])
        .build();

    let mut reader = CaptureReader::new(data, 202005);
    reader.decode_prologue(&SKELETON_ONLY).unwrap();
    assert_eq!(reader.skeleton_definition().joint_count(), 1);

    let mut frames = Vec::new();
    loop {
        match reader.step_frame(false) {
            StepOutcome::Continued => {
                reader.decode_frame(&SKELETON_ONLY);
                assert!(!reader.has_overflow());
                frames.push(reader.skeleton_transforms().clone());
            }
            StepOutcome::Halted => break,
            StepOutcome::WrappedAndRestarted => unreachable!("looping is off"),
        }
    }

    assert_eq!(frames.len(), 2);
    assert!(frames.iter().all(|f| f.len() == 1));
    assert!(approx(frames[0].transforms()[0].translation, Vec3::new(0.0, 100.0, 0.0)));
    assert!(approx(frames[1].transforms()[0].translation, Vec3::new(0.0, 200.0, 0.0)));
    assert_eq!(reader.state(), ReaderState::Stopped);
}

#[test]
fn scenario_b_truncated_timestamp_sets_overflow() {
    let mut builder = CaptureBuilder::new().header(202005, 1, 1);
    builder = builder.bytes(&[0u8; 6]);
    let mut reader = CaptureReader::new(builder.build(), 202005);
    reader.decode_header().unwrap();

    assert_eq!(reader.step_frame(false), StepOutcome::Continued);
    reader.decode_camera_frame();
    assert!(reader.has_overflow());
    assert_eq!(*reader.camera_transform(), Transform::IDENTITY);
    assert!(matches!(reader.check(), Err(Error::BufferOverflow { .. })));

    // Stays set for every later read.
    reader.decode_camera_frame();
    assert!(reader.has_overflow());
}

#[test]
fn scenario_c_device_position_to_engine() {
    let data = CaptureBuilder::new()
        .header(202005, 1, 1)
        .camera(0.0, [1.0, 2.0, 3.0], [0.0; 3])
        .build();
    let mut reader = CaptureReader::new(data, 202005);
    reader.decode_header().unwrap();
    reader.step_frame(false);
    reader.decode_camera_frame();
    assert_eq!(reader.camera_transform().translation, Vec3::new(-300.0, 100.0, 200.0));
}

#[test]
fn cursor_overflow_is_sticky_until_reset() {
    let mut c = ByteCursor::new(vec![1u8, 0, 0, 0, 2, 0, 0, 0]);
    assert_eq!(c.read_i32(), 1);
    assert_eq!(c.read_i32(), 2);
    assert!(!c.has_overflow());

    assert_eq!(c.read_u8(), 0);
    assert!(c.has_overflow());
    assert_eq!(c.read_i32(), 0);
    assert!(c.has_overflow());

    c.reset();
    assert!(!c.has_overflow());
    assert_eq!(c.read_i32(), 1);
}

#[test]
fn exhaustion_ignores_trailing_frames() {
    let data = camera_capture(3).camera(99.0, [0.0; 3], [0.0; 3]).build();
    let mut reader = CaptureReader::new(data, 202005);
    reader.decode_prologue(&CaptureLayout::CAMERA).unwrap();

    let mut decoded = 0;
    while reader.step_frame(false) == StepOutcome::Continued {
        reader.decode_camera_frame();
        decoded += 1;
    }
    assert_eq!(decoded, 3);
    assert_eq!(reader.camera_metadata().timestamp, 2.0);
    assert!(reader.is_halted());
}

#[test]
fn loop_wrap_rewinds_to_offset_zero() {
    let mut reader = CaptureReader::new(camera_capture(2).build(), 202005);
    reader.decode_prologue(&CaptureLayout::CAMERA).unwrap();

    for _ in 0..2 {
        assert_eq!(reader.step_frame(true), StepOutcome::Continued);
        reader.decode_camera_frame();
    }
    assert!(reader.cursor().tell() > 0);

    assert_eq!(reader.step_frame(true), StepOutcome::WrappedAndRestarted);
    assert_eq!(reader.cursor().tell(), 0);
    assert_eq!(reader.current_frame(), 0);
    assert_eq!(reader.state(), ReaderState::Fresh);

    reader.decode_prologue(&CaptureLayout::CAMERA).unwrap();
    assert_eq!(reader.step_frame(true), StepOutcome::Continued);
    reader.decode_camera_frame();
    assert_eq!(reader.camera_metadata().timestamp, 0.0);
}

#[test]
fn halted_reader_ignores_decodes() {
    let mut reader = CaptureReader::new(camera_capture(1).build(), 202005);
    reader.decode_prologue(&CaptureLayout::CAMERA).unwrap();
    reader.step_frame(false);
    reader.decode_camera_frame();
    let offset = reader.cursor().tell();

    assert_eq!(reader.step_frame(false), StepOutcome::Halted);
    reader.decode_camera_frame();
    reader.decode_skeleton_frame();
    assert_eq!(reader.cursor().tell(), offset);
    assert_eq!(reader.step_frame(true), StepOutcome::Halted);
}

#[test]
fn conversion_is_deterministic() {
    let m = Mat4::from_rotation_translation(
        Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
        Vec3::new(0.25, -1.5, 3.0),
    );
    let data = CaptureBuilder::new()
        .header(202005, 1, 1)
        .skeleton(&["root"], &[-1])
        .skeleton_frame(&[m])
        .shared();

    let decode = || {
        let mut reader = CaptureReader::shared(data.clone(), 202005);
        reader.decode_prologue(&SKELETON_ONLY).unwrap();
        reader.step_frame(false);
        reader.decode_skeleton_frame();
        reader.skeleton_transforms().transforms()[0]
    };
    let (a, b) = (decode(), decode());
    assert_eq!(a.translation.to_array().map(f32::to_bits), b.translation.to_array().map(f32::to_bits));
    assert_eq!(a.rotation.to_array().map(f32::to_bits), b.rotation.to_array().map(f32::to_bits));
}

#[test]
fn parent_indices_precede_children() {
    let names = ["root", "pelvis", "spine", "neck", "thigh_l"];
    let parents = [-1, 0, 1, 2, 1];
    let data = CaptureBuilder::new()
        .header(202005, 0, 1)
        .skeleton(&names, &parents)
        .build();
    let mut reader = CaptureReader::new(data, 202005);
    reader.decode_prologue(&SKELETON_ONLY).unwrap();

    let def = reader.skeleton_definition();
    for (i, &p) in def.parent_indices.iter().enumerate().skip(1) {
        assert!(p == -1 || (0..i as i32).contains(&p), "joint {} parent {}", i, p);
    }
    assert!(def.validate().is_ok());
    assert_eq!(reader.skeleton_transforms().len(), names.len());
}

#[test]
fn hierarchy_validation_is_opt_in() {
    let data = CaptureBuilder::new()
        .header(202005, 0, 1)
        .skeleton(&["a", "b"], &[-1, 5])
        .shared();

    let lenient = ReaderConfig { layout: SKELETON_ONLY, ..Default::default() };
    let mut reader = CaptureReader::with_config(data.clone(), &lenient);
    assert!(reader.decode_prologue(&SKELETON_ONLY).is_ok());

    let strict = ReaderConfig { validate_hierarchy: true, ..lenient };
    let mut reader = CaptureReader::with_config(data, &strict);
    assert!(matches!(
        reader.decode_prologue(&SKELETON_ONLY),
        Err(Error::InvalidSkeleton(_))
    ));
}

#[test]
fn version_mismatch_aborts() {
    let data = camera_capture(2).shared();
    let mut reader = CaptureReader::shared(data.clone(), 202004);
    let err = reader.decode_prologue(&CaptureLayout::CAMERA).unwrap_err();
    assert!(matches!(err, Error::ProtocolVersionMismatch { expected: 202004, found: 202005 }));
    assert_eq!(reader.step_frame(true), StepOutcome::Halted);

    let legacy = CaptureBuilder::new()
        .header(202004, 1, 1)
        .camera(0.0, [0.0; 3], [0.0; 3])
        .build();
    let config = ReaderConfig { protocol_version: 202004, ..Default::default() };
    let mut reader = CaptureReader::with_config(std::sync::Arc::new(legacy.into()), &config);
    assert!(reader.decode_prologue(&config.layout).is_ok());
}

#[test]
fn project_capture_prologue() {
    let data = CaptureBuilder::new()
        .header(202005, 1, 4)
        .anchors(&[[1.0, 2.0, 3.0], [0.0, 0.0, -2.0]])
        .skeleton(&["root", "spine"], &[-1, 0])
        .camera(0.5, [0.0; 3], [0.0; 3])
        .skeleton_frame(&[Mat4::IDENTITY, translation(0.0, 1.0, 0.0)])
        .build();
    let mut reader = CaptureReader::new(data, 202005);

    reader.decode_header().unwrap();
    assert_eq!(reader.state(), ReaderState::HeaderRead);
    assert_eq!(reader.header().orientation(), DeviceOrientation::LandscapeRight);

    let anchors = reader.decode_user_anchors().to_engine();
    assert_eq!(anchors, vec![Vec3::new(-300.0, 100.0, 200.0), Vec3::new(200.0, 0.0, 0.0)]);
    assert_eq!(reader.state(), ReaderState::AnchorsRead);

    reader.decode_skeleton_definition().unwrap();
    assert_eq!(reader.state(), ReaderState::SkeletonDefined);

    reader.step_frame(false);
    reader.decode_frame(&CaptureLayout::PROJECT);
    assert_eq!(reader.state(), ReaderState::FrameReady);
    assert_eq!(reader.camera_metadata().timestamp, 0.5);
    assert!(approx(reader.skeleton_transforms().transforms()[1].translation, Vec3::new(0.0, 0.0, 100.0)));
    assert_eq!(reader.cursor().available(), 0);
}

#[test]
fn readers_share_one_buffer() {
    let data = camera_capture(2).shared();
    let mut a = CaptureReader::shared(data.clone(), 202005);
    let mut b = CaptureReader::shared(data, 202005);
    a.decode_prologue(&CaptureLayout::CAMERA).unwrap();
    b.decode_prologue(&CaptureLayout::CAMERA).unwrap();

    a.step_frame(false);
    a.decode_camera_frame();
    a.step_frame(false);
    a.decode_camera_frame();
    b.step_frame(false);
    b.decode_camera_frame();

    assert_eq!(a.camera_metadata().timestamp, 1.0);
    assert_eq!(b.camera_metadata().timestamp, 0.0);
}
