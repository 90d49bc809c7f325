// What you SEE now:
// • The current shape in grey, centred in the window. Its skeleton is drawn in yellow
//   (S toggles it); segments you have traced turn green.
// • Press the left mouse ON the skeleton and trace the whole shape without lifting:
//   green paint follows the cursor.
// • Crossing your own line flashes red and resets; lifting the mouse resets quietly.
// • At 99% the shape fills green and the next shape loads after a short pause.
// • R resets the current shape. ESC quits. The window can be resized.

mod draw;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use draw::{compose_shape, draw_crosshair, draw_line, draw_text_5x7, shade_top_bar, tint, Drawer, PointerEdge, PointerTracker};
use shape_trace::types::FrameBuffer;
use shape_trace::{
    build_skeleton_report, silhouette, DrawSession, FailureReason, ProgressThrottle, Result, Silhouette,
    TraceConfig, WorldTransform,
};

const FAILURE_FLASH: Duration = Duration::from_millis(500);
const NEXT_SHAPE_DELAY: Duration = Duration::from_secs(3);
const BUILTIN_SIZE: usize = 240;

#[derive(Parser, Debug)]
#[command(name = "shape-trace", about = "Trace each shape's skeleton in one continuous stroke")]
struct Args {
    /// Silhouette images; the alpha channel defines the shape. Built-in shapes are used when empty.
    images: Vec<PathBuf>,

    /// Initial window width
    #[arg(long, default_value_t = 960)]
    width: usize,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Show the skeleton overlay from the start
    #[arg(long)]
    show_skeleton: bool,

    /// JSON file with tuning overrides; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep lifted strokes (later strokes may not cross them) instead of resetting on lift
    #[arg(long)]
    keep_strokes: bool,
}

struct Shape {
    name: String,
    silhouette: Silhouette,
}

/* --- Built-in shapes (used when no image paths are given) --- */

fn rasterize(name: &str, inside: impl Fn(f64, f64) -> bool) -> Result<Shape> {
    let mut alpha = vec![0u8; BUILTIN_SIZE * BUILTIN_SIZE];
    for y in 0..BUILTIN_SIZE {
        for x in 0..BUILTIN_SIZE {
            if inside(x as f64 + 0.5, y as f64 + 0.5) {
                alpha[y * BUILTIN_SIZE + x] = 255;
            }
        }
    }
    Ok(Shape { name: name.to_string(), silhouette: Silhouette::new(BUILTIN_SIZE, BUILTIN_SIZE, alpha)? })
}

/// Even-odd point-in-polygon.
fn in_polygon(poly: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let ((xi, yi), (xj, yj)) = (poly[i], poly[j]);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn builtin_shapes() -> Result<Vec<Shape>> {
    let c = BUILTIN_SIZE as f64 / 2.0;
    let star: Vec<(f64, f64)> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { c - 8.0 } else { c * 0.42 };
            let a = std::f64::consts::PI * (i as f64 / 5.0) - std::f64::consts::FRAC_PI_2;
            (c + r * a.cos(), c + r * a.sin())
        })
        .collect();

    Ok(vec![
        rasterize("star", |x, y| in_polygon(&star, x, y))?,
        rasterize("ring", |x, y| {
            let d = ((x - c).powi(2) + (y - c).powi(2)).sqrt();
            (c - 40.0..c - 12.0).contains(&d)
        })?,
        rasterize("zigzag", |x, y| {
            let mid = c + 50.0 * (((x / 60.0).fract() - 0.5).abs() * 4.0 - 1.0);
            (20.0..BUILTIN_SIZE as f64 - 20.0).contains(&x) && (y - mid).abs() < 14.0
        })?,
    ])
}

/// Run the skeleton pipeline for `shape`, fit it to the viewport and start a fresh session.
fn start_shape(session: &mut DrawSession, shape: &Shape, viewport: (usize, usize), config: &TraceConfig) {
    let report = build_skeleton_report(&shape.silhouette, config);
    if report.polylines.is_empty() {
        warn!(shape = %shape.name, "shape has no drawable path");
    }
    let transform = WorldTransform::fit(
        shape.silhouette.width,
        shape.silhouette.height,
        viewport.0 as f64,
        viewport.1 as f64,
        config,
    );
    session.begin_session(shape.silhouette.clone(), &report.polylines, transform);
    info!(shape = %shape.name, branches = report.polylines.len(), "shape ready");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => TraceConfig::load(path)?,
        None => TraceConfig::default(),
    };
    let config = TraceConfig { lift_ends_attempt: base.lift_ends_attempt && !args.keep_strokes, ..base };
    config.validate()?;

    /* --- Shapes ---
       Visual: nothing yet; every silhouette is decoded up front. */
    let shapes = if args.images.is_empty() {
        builtin_shapes()?
    } else {
        args.images
            .iter()
            .map(|path| {
                Ok(Shape {
                    name: path.file_stem().map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned()),
                    silhouette: silhouette::load(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    /* --- Window + screen buffer ---
       Visual: window opens with the first shape centred. */
    let mut drawer = Drawer::new("Shape Trace", args.width, args.height)?;
    let mut screen = FrameBuffer::new(args.width, args.height);

    let mut session = DrawSession::new(config.clone())?;
    let mut current = 0;
    start_shape(&mut session, &shapes[current], (screen.width, screen.height), &config);

    let mut pointer = PointerTracker::default();
    let mut throttle = ProgressThrottle::new(config.progress_refresh_delay());
    let mut progress = 0.0;
    let mut show_skeleton = args.show_skeleton;
    let mut flash_until: Option<Instant> = None;
    let mut completed_at: Option<Instant> = None;
    let mut status = String::from("START ON THE YELLOW PATH");

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");
    let mut last_frame_time = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = now - last_frame_time;
        last_frame_time = now;

        /* 1) Follow window resizes.
           Visual: the shape re-centres; paint and traced segments stay where they were. */
        let (w, h) = drawer.size();
        if w > 0 && h > 0 && (w, h) != (screen.width, screen.height) {
            screen = FrameBuffer::new(w, h);
            let sil = &shapes[current].silhouette;
            session.update_transform(WorldTransform::fit(sil.width, sil.height, w as f64, h as f64, &config));
        }

        /* 2) Keys */
        if drawer.s_pressed_once() {
            show_skeleton = !show_skeleton;
        }
        if drawer.r_pressed_once() {
            session.reset_drawing();
            completed_at = None;
            throttle.request();
            status = String::from("RESET");
        }

        /* 3) Pointer -> session */
        let mouse = drawer.mouse_pos();
        match (pointer.update(drawer.left_mouse_down()), mouse) {
            (PointerEdge::Pressed, Some((x, y))) => {
                if session.on_pointer_down(x, y) {
                    status = String::from("TRACING");
                    throttle.request();
                } else if session.last_failure() == Some(FailureReason::NotOnPath) {
                    status = String::from("START ON THE YELLOW PATH");
                }
            }
            (PointerEdge::Held, Some((x, y))) if session.is_drawing() => {
                if session.on_pointer_move(x, y) {
                    throttle.request();
                } else {
                    // only a crossing gets the visible failure
                    debug!(reason = ?session.last_failure(), "move rejected");
                    session.reset_drawing();
                    flash_until = Some(now + FAILURE_FLASH);
                    throttle.request();
                    status = String::from("YOU CROSSED YOUR LINE - TRY AGAIN");
                }
            }
            (PointerEdge::Released, _) | (PointerEdge::Held, None) if session.is_drawing() => {
                session.on_pointer_up();
                if config.lift_ends_attempt {
                    session.reset_drawing();
                    status = String::from("DO NOT LIFT - TRY AGAIN");
                }
                throttle.request();
            }
            _ => {}
        }

        /* 4) Progress (throttled) and completion */
        if throttle.tick(dt) {
            progress = session.compute_progress();
            if completed_at.is_none() && progress >= config.completion_threshold {
                session.paint_everything_complete();
                progress = 100.0;
                completed_at = Some(now);
                status = String::from("WELL DONE!");
            }
        }
        if completed_at.is_some_and(|t| now.duration_since(t) >= NEXT_SHAPE_DELAY) {
            current = (current + 1) % shapes.len();
            start_shape(&mut session, &shapes[current], (screen.width, screen.height), &config);
            completed_at = None;
            progress = 0.0;
            status = String::from("START ON THE YELLOW PATH");
        }

        /* 5) Compose: shape + paint, skeleton, cursor, failure flash, HUD */
        let shape = &shapes[current];
        compose_shape(&mut screen, &shape.silhouette, session.surface(), &session.transform());

        if show_skeleton {
            for seg in session.coverage().segments() {
                let color = if seg.covered { 0x00_33_CC_66 } else { 0x00_FF_CC_33 };
                draw_line(
                    &mut screen,
                    seg.start.x.round() as i32,
                    seg.start.y.round() as i32,
                    seg.end.x.round() as i32,
                    seg.end.y.round() as i32,
                    color,
                );
            }
        }

        if let Some((mx, my)) = mouse {
            let color = if session.snap(mx, my).on_path { 0x00_33_FF_66 } else { 0x00_FF_FF_FF };
            draw_crosshair(&mut screen, mx as i32, my as i32, 12, color);
        }

        if flash_until.is_some_and(|t| now < t) {
            tint(&mut screen, 0x00_FF_20_20, 90);
        }

        shade_top_bar(&mut screen, 34, 140);
        let hud = format!(
            "{} | PROGRESS: {:.1}% | TRACED: {:.0}% | {}",
            shape.name,
            progress,
            session.coverage().covered_fraction() * 100.0,
            hud_fps_text
        );
        draw_text_5x7(&mut screen, 8, 6, &hud, 0x00_FF_FF_FF);
        draw_text_5x7(&mut screen, 8, 20, &format!("{status} | R: RESET  S: SKELETON  ESC: QUIT"), 0x00_CC_CC_CC);

        /* 6) Present */
        drawer.present(&screen)?;

        /* 7) FPS counter (log + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
