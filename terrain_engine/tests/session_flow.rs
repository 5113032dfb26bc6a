mod common;

use std::fs;

use anyhow::Result;
use common::{A_POINTS, B_POINTS, SessionFixture, approx, write_session};
use glam::{Vec2, Vec3};
use terrain_engine::config::{ModeConfig, TerrainConfig};
use terrain_engine::DetailOverlayBridge;
use terrain_engine::{
    CategoryId, HistoryOp, InputEvent, LoadError, LoadPhase, LoadProgress, MarkerId, ModeClass,
    OverlayContent, PointerButton, ScreenRect, TopDownDirection, ViewerContext, ViewerEvent,
    load_session,
};

const FRAME: f64 = 1.0 / 60.0;

fn load(fixture: &SessionFixture) -> Result<(ViewerContext, LoadProgress)> {
    let mut progress = LoadProgress::default();
    let context = load_session(&fixture.manifest, None, &mut progress)?;
    Ok((context, progress))
}

/// Ticks until the camera is back under interactive control.
fn settle(context: &mut ViewerContext, mut now: f64) -> f64 {
    context.tick(now);
    while !context.rig().is_interactive() {
        now += FRAME;
        context.tick(now);
    }
    now
}

fn run(context: &mut ViewerContext, from: f64, seconds: f64) -> f64 {
    let mut now = from;
    while now < from + seconds {
        now += FRAME;
        context.tick(now);
    }
    now
}

fn pixel_of(context: &ViewerContext, marker: MarkerId) -> Vec2 {
    let record = context.markers().record(marker).expect("marker exists");
    context
        .camera()
        .project(record.position, context.viewport())
        .expect("marker in view")
}

fn click(context: &mut ViewerContext, at: Vec2, now: f64) -> Vec<ViewerEvent> {
    let mut events = context.handle(
        InputEvent::PointerDown {
            position: at,
            button: PointerButton::Primary,
        },
        now,
    );
    events.extend(context.handle(
        InputEvent::PointerUp {
            position: at,
            button: PointerButton::Primary,
        },
        now,
    ));
    events
}

fn opened(events: &[ViewerEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, ViewerEvent::OverlayOpened { .. }))
        .count()
}

#[test]
fn two_categories_load_into_five_markers_and_toggle_independently() -> Result<()> {
    let fixture = write_session()?;
    let (mut context, progress) = load(&fixture)?;

    assert_eq!(progress.phase(), &LoadPhase::Ready);
    assert_eq!(progress.skipped_rows(), 1, "the non-numeric well row");

    let markers = context.markers();
    assert_eq!(markers.len(), 5);
    let a = markers.group(CategoryId(0)).expect("group A");
    let b = markers.group(CategoryId(1)).expect("group B");
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 2);

    let expected = |(x, y): (f64, f64)| {
        Vec3::new((x * 0.5 - 100.0) as f32, 2.0, (-(y * 0.5) - 50.0) as f32)
    };
    for (record, point) in a.records().iter().zip(A_POINTS) {
        assert_eq!(record.position, expected(point));
    }
    for (record, point) in b.records().iter().zip(B_POINTS) {
        assert_eq!(record.position, expected(point));
    }
    let positions: Vec<Vec3> = markers.visible_markers().map(|(_, r)| r.position).collect();
    for (i, p) in positions.iter().enumerate() {
        for q in &positions[i + 1..] {
            assert!(p.distance(*q) > 1.0, "markers {p:?} and {q:?} collapsed");
        }
    }
    assert_eq!(a.records()[0].key.as_deref(), Some("W-1"));

    let events = context.handle(InputEvent::ToggleCategory(CategoryId(0)), 0.0);
    assert_eq!(
        events,
        vec![ViewerEvent::CategoryVisibility {
            category: CategoryId(0),
            visible: false,
            visible_markers: 2,
        }]
    );
    let markers = context.markers();
    assert_eq!(markers.visible_len(), 2);
    assert!(markers.group(CategoryId(1)).expect("group B").is_visible());
    assert!(
        markers
            .visible_markers()
            .all(|(id, _)| id.category == CategoryId(1))
    );
    Ok(())
}

#[test]
fn top_down_always_ends_north_up() -> Result<()> {
    let fixture = write_session()?;
    let (mut context, _) = load(&fixture)?;
    let mut now = settle(&mut context, 0.0);
    let target = context.camera().target;
    let mut overhead = None;

    for drag in [Vec2::new(120.0, 30.0), Vec2::new(-260.0, -15.0), Vec2::new(40.0, 90.0)] {
        let start = Vec2::new(400.0, 300.0);
        context.handle(
            InputEvent::PointerDown {
                position: start,
                button: PointerButton::Primary,
            },
            now,
        );
        context.handle(InputEvent::PointerMove { position: start + drag }, now);
        let released = context.handle(
            InputEvent::PointerUp {
                position: start + drag,
                button: PointerButton::Primary,
            },
            now,
        );
        assert_eq!(released, vec![ViewerEvent::DragIgnored]);
        now = run(&mut context, now, 1.5);
        assert!(!context.top_down().is_overhead(context.camera()));

        let events = context.handle(InputEvent::DoubleActivate, now);
        assert_eq!(
            events,
            vec![ViewerEvent::TopDownStarted {
                direction: TopDownDirection::ToOverhead
            }]
        );
        now = settle(&mut context, now);

        let camera = context.camera();
        assert!((camera.up() - Vec3::NEG_Z).length() < 1e-3, "{:?}", camera.up());
        assert!((camera.forward() - Vec3::NEG_Y).length() < 1e-3);
        assert!((camera.target - target).length() < 1e-3);
        let orientation = camera.orientation;
        let first = *overhead.get_or_insert(orientation);
        assert!(orientation.dot(first).abs() > 1.0 - 1e-4);

        let back = context.handle(InputEvent::DoubleActivate, now);
        assert_eq!(
            back,
            vec![ViewerEvent::TopDownStarted {
                direction: TopDownDirection::Returning
            }]
        );
        now = settle(&mut context, now);
    }
    Ok(())
}

#[test]
fn clicking_a_marker_opens_the_overlay_once_with_history() -> Result<()> {
    let fixture = write_session()?;
    let (mut context, _) = load(&fixture)?;
    let mut now = settle(&mut context, 0.0);

    let well = MarkerId {
        category: CategoryId(0),
        index: 0,
    };
    let at = pixel_of(&context, well);

    context.handle(InputEvent::PointerMove { position: at }, now);
    now += FRAME;
    let frame = context.tick(now);
    assert!(frame.events.contains(&ViewerEvent::HoverChanged {
        category: Some(CategoryId(0)),
        marker: Some(well),
    }));
    let dimmed = context.config().markers.dimmed_opacity;
    assert_eq!(
        context.markers().group(CategoryId(0)).map(|g| g.opacity()),
        Some(1.0)
    );
    assert_eq!(
        context.markers().group(CategoryId(1)).map(|g| g.opacity()),
        Some(dimmed)
    );

    let events = click(&mut context, at, now);
    let content = OverlayContent::Key {
        category: CategoryId(0),
        key: "W-1".to_string(),
    };
    assert_eq!(
        events,
        vec![
            ViewerEvent::OverlayOpened {
                marker: well,
                content: content.clone(),
            },
            ViewerEvent::History {
                op: HistoryOp::Push { content },
            },
        ]
    );

    let again = click(&mut context, at, now + 1.0);
    assert_eq!(opened(&again), 0);
    assert!(again.contains(&ViewerEvent::ClickSuppressed { marker: well }));

    let back = context.handle(InputEvent::Back, now + 2.0);
    assert_eq!(
        back,
        vec![
            ViewerEvent::OverlayClosed { by_back: true },
            ViewerEvent::History { op: HistoryOp::Pop },
        ]
    );
    assert_eq!(opened(&click(&mut context, at, now + 2.1)), 0, "debounced");
    assert_eq!(opened(&click(&mut context, at, now + 2.6)), 1);

    let closed = context.handle(InputEvent::CloseOverlay, now + 3.0);
    assert_eq!(
        closed,
        vec![
            ViewerEvent::OverlayClosed { by_back: false },
            ViewerEvent::History {
                op: HistoryOp::Replace
            },
        ]
    );
    assert!(context.handle(InputEvent::CloseOverlay, now + 3.1).is_empty());
    Ok(())
}

#[test]
fn clicks_on_overlay_regions_and_drags_open_nothing() -> Result<()> {
    let fixture = write_session()?;
    let (mut context, _) = load(&fixture)?;
    let now = settle(&mut context, 0.0);
    let at = pixel_of(
        &context,
        MarkerId {
            category: CategoryId(1),
            index: 1,
        },
    );

    context.handle(
        InputEvent::SetOverlayRegions(vec![ScreenRect {
            x: at.x - 20.0,
            y: at.y - 20.0,
            width: 40.0,
            height: 40.0,
        }]),
        now,
    );
    assert_eq!(opened(&click(&mut context, at, now)), 0);
    assert!(!context.overlay().is_open());

    context.handle(InputEvent::SetOverlayRegions(Vec::new()), now);
    context.handle(
        InputEvent::PointerDown {
            position: at - Vec2::new(30.0, 0.0),
            button: PointerButton::Primary,
        },
        now + 1.0,
    );
    let events = context.handle(
        InputEvent::PointerUp {
            position: at,
            button: PointerButton::Primary,
        },
        now + 1.0,
    );
    assert_eq!(events, vec![ViewerEvent::DragIgnored]);
    assert!(!context.overlay().is_open());
    Ok(())
}

#[test]
fn mode_toggle_crossfades_every_channel_and_ignores_retrigger() -> Result<()> {
    let fixture = write_session()?;
    let (mut context, _) = load(&fixture)?;
    context.tick(0.0);

    assert_eq!(
        context.handle(InputEvent::ToggleMode, 0.1),
        vec![ViewerEvent::ModeToggleStarted { target: 1.0 }]
    );
    assert_eq!(
        context.handle(InputEvent::ToggleMode, 0.2),
        vec![ViewerEvent::ModeToggleIgnored]
    );

    let mut now = 0.1;
    let mut settled = None;
    while settled.is_none() {
        now += FRAME;
        let frame = context.tick(now);
        assert!(approx(
            frame.mode_value,
            context.materials().blend_factor(),
            0.0
        ));
        if frame.events.contains(&ViewerEvent::ModeSettled {
            class: ModeClass::Dark,
        }) {
            settled = Some(frame);
        }
        assert!(now < 5.0, "crossfade never settled");
    }
    let frame = settled.expect("settled frame");
    assert_eq!(frame.mode_value, 1.0);
    assert_eq!(frame.mode_class, ModeClass::Dark);
    assert_eq!(frame.background, ModeConfig::default().dark_background);
    assert_eq!(frame.terrain_color, TerrainConfig::default().ground_dark);
    assert_eq!(frame.structure_color, TerrainConfig::default().structure_dark);
    Ok(())
}

#[test]
fn terrain_and_dataset_failures_abort_the_load() -> Result<()> {
    let fixture = write_session()?;
    fs::remove_file(fixture.path("site.json"))?;
    let mut progress = LoadProgress::default();
    let result = load_session(&fixture.manifest, None, &mut progress);
    assert!(matches!(result, Err(LoadError::Terrain { .. })));
    assert!(progress.is_failed());

    let fixture = write_session()?;
    fs::write(
        &fixture.manifest,
        r#"{"terrain":"site.json","config":"viewer.json","datasets":[{"category":"C","path":"trees.csv"}]}"#,
    )?;
    let mut progress = LoadProgress::default();
    let result = load_session(&fixture.manifest, None, &mut progress);
    assert!(matches!(result, Err(LoadError::UnknownCategory { .. })));
    assert!(progress.is_failed());

    fs::write(
        &fixture.manifest,
        r#"{"terrain":"site.json","config":"viewer.json","datasets":[{"category":"A","path":"missing.csv"}]}"#,
    )?;
    let mut progress = LoadProgress::default();
    match load_session(&fixture.manifest, None, &mut progress) {
        Err(LoadError::Dataset { message, .. }) => assert!(message.contains("missing.csv")),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("missing dataset must be fatal"),
    }
    Ok(())
}

#[test]
fn first_fit_covers_terrain_and_markers() -> Result<()> {
    let fixture = write_session()?;
    let (context, _) = load(&fixture)?;
    let bounds = context.scene_bounds().expect("scene bounds");
    assert_eq!(bounds.min, [-50.0, 0.0, -150.0]);
    assert_eq!(bounds.max, [110.0, 5.0, -50.0]);

    let camera = context.camera();
    assert_eq!(camera.target, bounds.center());
    assert!(approx(camera.frustum_half_height, 160.0 * 0.6, 1e-3));
    assert_eq!(context.terrain().structure_sides.len(), 1);
    Ok(())
}
