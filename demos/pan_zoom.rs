//! Pan/zoom over a checkerboard.
//!
//! Expects a `<canvas id="root">` filling the page. Wheel or two-finger drag
//! pans, ctrl+wheel or pinch zooms, `Home` fits the whole board, and the
//! clicked tile is highlighted.

use std::cell::RefCell;
use std::rc::Rc;

use framekit::{
    Camera, Component, Error, FrameApp, FrameOptions, InputManager, InputOptions, Point, Rect, RenderProps, Result,
    UpdateProps,
};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;
const TILE: f64 = 50.0;
const TILES: i32 = 20;

struct Demo {
    camera: Rc<RefCell<Camera>>,
    input: InputManager,
    selected: Option<(i32, i32)>,
}

fn board() -> Rect {
    let half = TILE * f64::from(TILES) / 2.0;
    Rect::new(-half, -half, half * 2.0, half * 2.0)
}

fn tile_at(world: Point) -> Option<(i32, i32)> {
    let bounds = board();
    if !bounds.contains(world) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let tile = (((world.x - bounds.x) / TILE) as i32, ((world.y - bounds.y) / TILE) as i32);
    Some(tile)
}

struct Board;

impl Component<CanvasRenderingContext2d, Demo> for Board {
    fn update(&mut self, props: UpdateProps<'_, Demo>) {
        let demo = props.context;
        let mut camera = demo.camera.borrow_mut();
        camera.update(props.window_size);

        let input = demo.input.state();
        if let Some(zoom) = input.just_zoom() {
            camera.scale = (camera.scale + zoom.delta).clamp(MIN_ZOOM, MAX_ZOOM);
        }
        if let Some(pan) = input.just_pan() {
            camera.position += pan.offset;
        }
        if input.was_just_pressed("Home") {
            if let Err(err) = camera.fit_to(&board()) {
                log::warn!("cannot fit board: {err}");
            }
        }
        if let Some(tap) = input.just_touched_up() {
            demo.selected = tile_at(tap.position);
            log::debug!("selected {:?}", demo.selected);
        }
        drop(input);

        demo.input.clear_one_frame_events();
    }

    fn render(&mut self, props: RenderProps<'_, CanvasRenderingContext2d, Demo>) -> Result<()> {
        let size = props.window_size;
        let ctx = props.surface;
        ctx.clear_rect(0.0, 0.0, size.width, size.height);

        let camera = *props.context.camera.borrow();
        let selected = props.context.selected;
        let bounds = board();
        camera.draw(ctx, |ctx| {
            for row in 0..TILES {
                for col in 0..TILES {
                    let color = if selected == Some((col, row)) {
                        "#e4572e"
                    } else if (row + col) % 2 == 0 {
                        "#2e3440"
                    } else {
                        "#d8dee9"
                    };
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(
                        bounds.x + f64::from(col) * TILE,
                        bounds.y + f64::from(row) * TILE,
                        TILE,
                        TILE,
                    );
                }
            }
        })
    }
}

fn run() -> Result<()> {
    framekit::logging::init(log::Level::Debug)?;

    let document = framekit::dom::window()?.document().ok_or(Error::NoWindow)?;
    let canvas = document
        .get_element_by_id("root")
        .ok_or_else(|| Error::Platform("missing #root canvas".to_owned()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::Platform("#root is not a canvas".to_owned()))?;

    let camera = Rc::new(RefCell::new(Camera::new()));
    let view = Rc::clone(&camera);
    let input = InputManager::with_transform(&canvas, InputOptions::default(), move |p| {
        view.borrow().screen_to_world(p).unwrap_or_else(|err| {
            log::warn!("pointer left in screen space: {err}");
            p
        })
    })?;

    let demo = Demo { camera, input, selected: None };
    let app = FrameApp::start(&canvas, demo, Board, FrameOptions::default())?;
    // Runs for the lifetime of the page.
    std::mem::forget(app);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        log::error!("pan_zoom failed to start: {err}");
    }
}
