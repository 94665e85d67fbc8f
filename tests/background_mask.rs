mod common;

use anyhow::anyhow;
use camfilter::segmentation::SEGMENTATION_SIZE;
use camfilter::{
    BackgroundMaskFilter, FrameStatus, MaskSettings, PassReason, PixelFormat, VideoFilter, VideoFrame,
};
use common::{solid_rgba, tensor, FnEngine};
use ndarray::Axis;

const PIXELS: usize = 256 * 256;

fn constant_filter(probability: f32, threshold: f64) -> (BackgroundMaskFilter, std::rc::Rc<std::cell::Cell<usize>>) {
    let (engine, calls) = FnEngine::new(SEGMENTATION_SIZE, move |_| {
        Ok(vec![tensor(&[1, 256, 256, 1], vec![probability; PIXELS])])
    });
    let filter = BackgroundMaskFilter::new(Box::new(engine), MaskSettings { threshold }).unwrap();
    (filter, calls)
}

#[test]
fn full_hd_frame_produces_centered_mask() {
    let data = solid_rgba(1920, 1080, [40, 80, 120, 255]);
    let frame = VideoFrame::packed(1920, 1080, PixelFormat::Rgba, &data, 1920 * 4);
    let (mut filter, calls) = constant_filter(0.81, 0.8);

    assert_eq!(filter.filter_video(&frame), FrameStatus::Processed);
    assert_eq!(calls.get(), 1);

    let render = filter.mask_render().unwrap();
    assert_eq!((render.width, render.height), (342, 256));
    for row in render.mask.chunks_exact(342) {
        assert!(row[..43].iter().all(|&v| v == 0));
        assert!(row[43..299].iter().all(|&v| v == 207));
        assert!(row[299..].iter().all(|&v| v == 0));
    }
}

#[test]
fn below_threshold_probability_is_cleared() {
    let data = solid_rgba(1920, 1080, [0, 0, 0, 255]);
    let frame = VideoFrame::packed(1920, 1080, PixelFormat::Rgba, &data, 1920 * 4);
    let (mut filter, _) = constant_filter(0.79, 0.8);

    assert_eq!(filter.filter_video(&frame), FrameStatus::Processed);
    assert!(filter.mask_render().unwrap().mask.iter().all(|&v| v == 0));
}

#[test]
fn threshold_update_applies_to_next_frame() {
    let data = solid_rgba(640, 480, [0, 0, 0, 255]);
    let frame = VideoFrame::packed(640, 480, PixelFormat::Rgba, &data, 640 * 4);
    let (mut filter, _) = constant_filter(0.5, 0.8);

    filter.filter_video(&frame);
    assert!(filter.mask_render().unwrap().mask.iter().all(|&v| v == 0));

    filter.update(MaskSettings { threshold: 0.4 });
    filter.filter_video(&frame);
    assert!(filter.mask_render().unwrap().mask.iter().all(|&v| v == 128));
}

#[test]
fn mask_lines_up_with_the_frame() {
    // left half white, right half black; the engine echoes the red channel
    let (width, height) = (640u32, 480u32);
    let mut data = solid_rgba(width, height, [0, 0, 0, 255]);
    for (i, px) in data.chunks_exact_mut(4).enumerate() {
        if (i as u32 % width) < width / 2 {
            px[..3].copy_from_slice(&[255, 255, 255]);
        }
    }
    let frame = VideoFrame::packed(width, height, PixelFormat::Rgba, &data, width as usize * 4);
    let (engine, _) = FnEngine::new(SEGMENTATION_SIZE, |input| {
        let red = input.index_axis(Axis(3), 0).to_owned();
        Ok(vec![red.into_dyn()])
    });
    let mut filter = BackgroundMaskFilter::new(Box::new(engine), MaskSettings { threshold: 0.5 }).unwrap();

    assert_eq!(filter.filter_video(&frame), FrameStatus::Processed);
    let render = filter.mask_render().unwrap();
    assert_eq!((render.width, render.height), (256, 256));
    for row in render.mask.chunks_exact(256) {
        assert!(row[..120].iter().all(|&v| v == 255));
        assert!(row[136..].iter().all(|&v| v == 0));
    }
}

#[test]
fn tall_frame_mask_is_vertically_centered() {
    let data = solid_rgba(480, 960, [0, 0, 0, 255]);
    let frame = VideoFrame::packed(480, 960, PixelFormat::Rgba, &data, 480 * 4);
    let (mut filter, _) = constant_filter(1.0, 0.8);

    assert_eq!(filter.filter_video(&frame), FrameStatus::Processed);
    let render = filter.mask_render().unwrap();
    // crop is 480x360, mask is 256 x 256*960/360
    assert_eq!((render.width, render.height), (256, 682));
    let rows: Vec<&[u8]> = render.mask.chunks_exact(256).collect();
    let top = (682 - 256) / 2;
    assert!(rows[top - 1].iter().all(|&v| v == 0));
    assert!(rows[top].iter().all(|&v| v == 255));
    assert!(rows[top + 255].iter().all(|&v| v == 255));
    assert!(rows[top + 256].iter().all(|&v| v == 0));
}

#[test]
fn size_change_reallocates_mask_and_params() {
    let (mut filter, _) = constant_filter(1.0, 0.8);

    let wide = solid_rgba(1920, 1080, [0, 0, 0, 255]);
    filter.filter_video(&VideoFrame::packed(1920, 1080, PixelFormat::Rgba, &wide, 1920 * 4));
    let first = filter.mask_render().unwrap().params;

    let square = solid_rgba(640, 480, [0, 0, 0, 255]);
    filter.filter_video(&VideoFrame::packed(640, 480, PixelFormat::Rgba, &square, 640 * 4));
    let render = filter.mask_render().unwrap();
    assert_eq!((render.width, render.height), (256, 256));
    assert_eq!(render.mask.len(), 256 * 256);
    assert_ne!(render.params, first);
    assert_eq!(render.params.texel_size, (1.0 / 640.0, 1.0 / 480.0));
}

#[test]
fn degraded_frames_pass_through() {
    let (mut filter, calls) = constant_filter(1.0, 0.8);

    let empty = VideoFrame::packed(0, 0, PixelFormat::Rgba, &[], 0);
    assert_eq!(
        filter.filter_video(&empty),
        FrameStatus::PassThrough(PassReason::DegradedInput)
    );

    let sliver = solid_rgba(10, 1, [0, 0, 0, 255]);
    assert_eq!(
        filter.filter_video(&VideoFrame::packed(10, 1, PixelFormat::Rgba, &sliver, 40)),
        FrameStatus::PassThrough(PassReason::Geometry)
    );

    let planar = vec![0u8; 640 * 480 * 3 / 2];
    assert_eq!(
        filter.filter_video(&VideoFrame::packed(640, 480, PixelFormat::I420, &planar, 640)),
        FrameStatus::PassThrough(PassReason::DegradedInput)
    );

    assert_eq!(calls.get(), 0);
    assert!(filter.mask_render().is_none());
}

#[test]
fn engine_failure_keeps_previous_mask() {
    let mut fail = false;
    let (engine, _) = FnEngine::new(SEGMENTATION_SIZE, move |_| {
        if fail {
            return Err(anyhow!("device lost"));
        }
        fail = true;
        Ok(vec![tensor(&[PIXELS], vec![1.0; PIXELS])])
    });
    let mut filter = BackgroundMaskFilter::new(Box::new(engine), MaskSettings::default()).unwrap();
    let data = solid_rgba(640, 480, [0, 0, 0, 255]);
    let frame = VideoFrame::packed(640, 480, PixelFormat::Rgba, &data, 640 * 4);

    assert_eq!(filter.filter_video(&frame), FrameStatus::Processed);
    assert_eq!(
        filter.filter_video(&frame),
        FrameStatus::PassThrough(PassReason::Inference)
    );
    assert!(filter.mask_render().unwrap().mask.iter().all(|&v| v == 255));
}

#[test]
fn short_output_passes_through() {
    let (engine, _) = FnEngine::new(SEGMENTATION_SIZE, |_| Ok(vec![tensor(&[10], vec![1.0; 10])]));
    let mut filter = BackgroundMaskFilter::new(Box::new(engine), MaskSettings::default()).unwrap();
    let data = solid_rgba(640, 480, [0, 0, 0, 255]);
    let frame = VideoFrame::packed(640, 480, PixelFormat::Rgba, &data, 640 * 4);
    assert_eq!(
        filter.filter_video(&frame),
        FrameStatus::PassThrough(PassReason::Inference)
    );
}

#[test]
fn wrong_engine_size_is_rejected() {
    let (engine, _) = FnEngine::new((128, 128), |_| Ok(vec![]));
    assert!(BackgroundMaskFilter::new(Box::new(engine), MaskSettings::default()).is_err());
}

#[test]
fn mask_can_be_saved_as_png() {
    let (mut filter, _) = constant_filter(1.0, 0.8);
    let data = solid_rgba(1280, 720, [0, 0, 0, 255]);
    filter.filter_video(&VideoFrame::packed(1280, 720, PixelFormat::Rgba, &data, 1280 * 4));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    let render = filter.mask_render().unwrap();
    render.to_image().unwrap().save(&path).unwrap();

    let loaded = image::open(&path).unwrap().to_luma8();
    assert_eq!(loaded.dimensions(), (render.width, render.height));
    assert_eq!(loaded.as_raw().as_slice(), render.mask);
}
