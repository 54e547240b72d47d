use climate_chart::api::{ChartConfig, ChartEngine, GridlineConfig};
use climate_chart::core::{AggregatedPoint, CanvasPoint, Viewport};
use climate_chart::interaction::ChartPhase;
use climate_chart::render::NullRenderer;
use climate_chart::{ChartError, ChartResult};

fn engine(width: u32, height: u32) -> ChartEngine<NullRenderer> {
    ChartEngine::new(
        NullRenderer::default(),
        ChartConfig::new(Viewport::new(width, height)).with_padding_x(10.0),
    )
    .expect("engine init")
}

fn sample_points() -> Vec<AggregatedPoint> {
    vec![
        AggregatedPoint::new(0.0, 10.0),
        AggregatedPoint::new(50.0, 20.0),
        AggregatedPoint::new(100.0, 15.0),
    ]
}

#[test]
fn draw_moves_idle_to_rendered_and_projects_points() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    assert_eq!(engine.phase(), ChartPhase::Idle);

    engine.draw(&sample_points())?;

    assert_eq!(engine.phase(), ChartPhase::Rendered);
    assert_eq!(
        engine.canvas_points(),
        &[
            CanvasPoint::new(10, 300),
            CanvasPoint::new(310, 100),
            CanvasPoint::new(610, 200),
        ]
    );
    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    assert_eq!(frame.polylines.len(), 1);
    Ok(())
}

#[test]
fn every_render_is_preceded_by_clear() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&sample_points())?;
    for x in [0.0, 100.0, 305.0, 620.0, 900.0] {
        engine.on_hover(x)?;
    }
    engine.on_hover_end()?;
    engine.resize(Viewport::new(800, 400))?;
    engine.draw(&sample_points())?;

    let renderer = engine.renderer();
    assert_eq!(renderer.renders_without_clear, 0);
    assert_eq!(renderer.render_count, 9);
    assert_eq!(renderer.clear_count, 9);
    Ok(())
}

#[test]
fn hover_state_machine_follows_pointer() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    assert_eq!(engine.on_hover(100.0)?, None);
    assert_eq!(engine.renderer().render_count, 0);

    engine.draw(&sample_points())?;
    let first = engine.on_hover(200.0)?.expect("target");
    assert_eq!(engine.phase(), ChartPhase::Highlighted);
    assert_eq!(first.index, 1);
    assert_eq!(first.value, 20.0);

    let second = engine.on_hover(590.0)?.expect("target");
    assert_eq!(engine.phase(), ChartPhase::Highlighted);
    assert_eq!(second.index, 2);
    assert_eq!(engine.hover_target(), Some(second));

    engine.on_hover_end()?;
    assert_eq!(engine.phase(), ChartPhase::Rendered);
    assert_eq!(engine.hover_target(), None);
    Ok(())
}

#[test]
fn highlight_draws_guide_marker_and_tooltip() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&sample_points())?;
    engine.on_hover(300.0)?;

    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    let guide = frame.lines.last().expect("guide line");
    assert_eq!((guide.x1, guide.y1, guide.x2, guide.y2), (310.0, 0.0, 310.0, 320.0));
    assert_eq!(frame.circles.len(), 1);
    assert_eq!(frame.circles[0].radius, 5.0);
    assert_eq!(frame.rects.len(), 1);
    assert_eq!(frame.rects[0].corner_radius, 5.0);
    assert!(frame.texts.iter().any(|text| text.text == "20.0"));
    assert!(frame.texts.iter().any(|text| text.text == "1970-01"));
    Ok(())
}

#[test]
fn tooltip_is_clamped_inside_surface() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&sample_points())?;

    engine.on_hover(0.0)?;
    let rect = engine.renderer().last_frame.as_ref().expect("frame").rects[0];
    assert_eq!(rect.x, 0.0);

    engine.on_hover(620.0)?;
    let rect = engine.renderer().last_frame.as_ref().expect("frame").rects[0];
    assert_eq!(rect.x, 500.0);
    assert_eq!(rect.right(), 620.0);
    Ok(())
}

#[test]
fn hover_end_restores_base_frame() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&sample_points())?;
    let base = engine.renderer().last_frame.clone().expect("frame");

    engine.on_hover(300.0)?;
    engine.on_hover_end()?;

    assert_eq!(engine.renderer().last_frame.as_ref(), Some(&base));
    assert_eq!(engine.current_frame(), base);
    Ok(())
}

#[test]
fn empty_draw_clears_and_disables_hover() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&[])?;

    assert_eq!(engine.phase(), ChartPhase::Rendered);
    assert!(engine.canvas_points().is_empty());
    assert!(engine.renderer().last_frame.as_ref().expect("frame").is_empty());
    assert_eq!(engine.on_hover(10.0)?, None);
    Ok(())
}

#[test]
fn single_point_is_drawn_as_dot() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&[AggregatedPoint::new(5.0, 5.0)])?;

    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    assert!(frame.polylines.is_empty());
    assert_eq!(frame.circles.len(), 1);
    assert_eq!(engine.on_hover(999.0)?.map(|target| target.index), Some(0));
    Ok(())
}

#[test]
fn flat_series_does_not_produce_nan() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.draw(&[AggregatedPoint::new(0.0, 3.0), AggregatedPoint::new(10.0, 3.0)])?;
    assert_eq!(engine.canvas_points()[0].y, engine.canvas_points()[1].y);
    Ok(())
}

#[test]
fn unsorted_or_non_finite_points_are_rejected() {
    let mut engine = engine(620, 320);
    let unsorted = [AggregatedPoint::new(5.0, 1.0), AggregatedPoint::new(1.0, 1.0)];
    assert!(matches!(engine.draw(&unsorted), Err(ChartError::InvalidData(_))));

    let nan = [AggregatedPoint::new(0.0, f64::NAN)];
    assert!(matches!(engine.draw(&nan), Err(ChartError::InvalidData(_))));
    assert_eq!(engine.phase(), ChartPhase::Idle);
}

#[test]
fn resize_remeasures_and_redraws() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.resize(Viewport::new(820, 420))?;
    assert_eq!(engine.renderer().render_count, 0);

    engine.draw(&sample_points())?;
    engine.resize(Viewport::new(1020, 520))?;

    assert_eq!(engine.geometry().plot_right, 1010.0);
    assert_eq!(engine.canvas_points().last(), Some(&CanvasPoint::new(1010, 300)));
    assert_eq!(engine.renderer().render_count, 2);

    assert!(matches!(
        engine.resize(Viewport::new(0, 100)),
        Err(ChartError::InvalidViewport { .. })
    ));
    Ok(())
}

#[test]
fn gridlines_label_inverse_mapped_values() -> ChartResult<()> {
    let config = ChartConfig::new(Viewport::new(620, 320))
        .with_padding_x(10.0)
        .with_gridlines(GridlineConfig::new(3));
    let mut engine = ChartEngine::new(NullRenderer::default(), config)?;
    engine.draw(&sample_points())?;

    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    let labels: Vec<&str> = frame.texts.iter().map(|text| text.text.as_str()).collect();
    assert_eq!(labels, vec!["20.0", "15.0", "10.0"]);
    assert_eq!(frame.lines.len(), 3);
    assert_eq!(engine.geometry().plot_left, 58.0);
    Ok(())
}

#[test]
fn custom_formatter_drives_tooltip_text() -> ChartResult<()> {
    let mut engine = engine(620, 320);
    engine.set_value_formatter(|value| format!("{value:.2} °C"));
    engine.draw(&sample_points())?;
    engine.on_hover(0.0)?;

    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    assert!(frame.texts.iter().any(|text| text.text == "10.00 °C"));
    Ok(())
}

#[test]
fn area_fill_adds_polygon_to_baseline() -> ChartResult<()> {
    let config = ChartConfig::new(Viewport::new(620, 320))
        .with_padding_x(10.0)
        .with_area_fill(true);
    let mut engine = ChartEngine::new(NullRenderer::default(), config)?;
    engine.draw(&sample_points())?;

    let frame = engine.renderer().last_frame.as_ref().expect("frame");
    let polygon = &frame.polygons[0];
    assert_eq!(polygon.vertices.len(), 5);
    assert_eq!(polygon.vertices[0].y, 300.0);
    assert_eq!(polygon.vertices[4].y, 300.0);
    Ok(())
}
