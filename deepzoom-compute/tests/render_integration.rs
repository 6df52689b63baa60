use deepzoom_compute::{
    direct_iterations, render, ChannelMasks, Navigator, Quality, RenderRequest, RenderSession, Vec2,
    Viewport,
};

fn request(viewport: Viewport, screen: (u32, u32), quality: Quality) -> RenderRequest {
    RenderRequest {
        viewport,
        screen,
        quality,
        masks: ChannelMasks::IDENTITY,
    }
}

#[test]
fn default_view_on_odd_screen() {
    let navigator = Navigator::new((81, 61));
    let result = render(&RenderRequest::from(&navigator)).unwrap();

    let image = result.image.unwrap();
    assert_eq!(image.dimensions(), (81, 61));
    // -0.75 never escapes
    assert_eq!(result.indices.get(40, 30), 0);
    assert_eq!(image.get_pixel(40, 30).0, [0, 0, 0]);
    // far left column lies outside the radius 2 disc
    assert_eq!(result.indices.get(0, 30), 1);
    assert_eq!(direct_iterations(Vec2::new(-2.2315, 0.0), 1024), 1);
}

#[test]
fn every_quality_level_renders() {
    let viewport = Viewport::from_f64(-0.5, 0.25, 2.0, 150, 40);
    for quality in Quality::ALL {
        let result = render(&request(viewport.clone(), (20, 15), quality)).unwrap();
        let (fx, fy) = quality.factor();

        assert_eq!(result.image.unwrap().dimensions(), (20, 15), "{}", quality.label());
        assert_eq!(result.stats.samples, u64::from(20 * fx * 15 * fy));
        assert_eq!(result.indices.len() as u64, result.stats.samples);
    }
}

#[test]
fn rendering_is_deterministic() {
    let viewport = Viewport::from_strings("-0.7436438870", "0.1318259042", "1e-6", 800).unwrap();
    let a = render(&request(viewport.clone(), (24, 18), Quality::X2)).unwrap();
    let b = render(&request(viewport, (24, 18), Quality::X2)).unwrap();

    assert_eq!(a.indices.to_vec(), b.indices.to_vec());
    assert_eq!(a.image, b.image);
}

#[test]
fn misiurewicz_frame_at_1e_290() {
    let viewport = Viewport::from_strings("0", "1", "1e-290", 3000).unwrap();
    let result = render(&request(viewport, (16, 12), Quality::X1)).unwrap();

    assert_eq!(result.stats.extra_exponent, 140);
    assert_eq!(result.stats.escaped, 16 * 12);
    for iterations in result.indices.to_vec() {
        assert!((770..=790).contains(&iterations), "{}", iterations);
    }
}

#[test]
fn session_feeds_next_limit_forward() {
    let mut navigator = Navigator::new((32, 24));
    navigator.set_iteration_limit(64);
    let mut session = RenderSession::new();

    session.submit(RenderRequest::from(&navigator)).unwrap();
    let first = session.wait().unwrap().unwrap();
    // every escape below 64 lands in the top bucket
    assert!(first.stats.next_iteration_limit > 64);
    assert!(first.stats.next_iteration_limit <= 64 + 32);

    navigator.set_iteration_limit(first.stats.next_iteration_limit);
    session.submit(RenderRequest::from(&navigator)).unwrap();
    let second = session.wait().unwrap().unwrap();
    assert_eq!(second.stats.iteration_limit, first.stats.next_iteration_limit);
}
