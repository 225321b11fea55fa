use gloo::events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent};

use crate::application::surface::{ChartSurface, SurfaceFactory};
use crate::domain::{
    chart::{ChartLayout, ChartTheme, SurfaceOptions, format_price, normalized_pixel_ratio},
    errors::{AppError, RenderingResult},
    logging::LogComponent,
    market_data::{Candle, CandleSeries, UpsertOutcome},
};
use crate::time_utils::format_time_label;
use crate::{log_debug, log_error};

const COMPONENT: LogComponent = LogComponent::Infrastructure("CanvasRenderer");
const PRICE_TICKS: usize = 5;
const LABEL_PADDING: f64 = 6.0;

fn js_error(context: &str, err: JsValue) -> AppError {
    AppError::RenderingError(format!("{context}: {err:?}"))
}

/// Creates canvas surfaces inside a container element.
pub struct CanvasSurfaceFactory {
    container: HtmlElement,
}

impl CanvasSurfaceFactory {
    pub fn new(container: HtmlElement) -> Self {
        Self { container }
    }

    fn context_2d(canvas: &HtmlCanvasElement) -> RenderingResult<CanvasRenderingContext2d> {
        canvas
            .get_context("2d")
            .map_err(|e| js_error("Failed to get 2D context", e))?
            .ok_or_else(|| AppError::RenderingError("2D context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::RenderingError("Failed to cast to 2D context".to_string()))
    }
}

impl SurfaceFactory for CanvasSurfaceFactory {
    type Surface = CanvasSurface;

    fn create(&self, options: &SurfaceOptions) -> RenderingResult<CanvasSurface> {
        let window = web_sys::window()
            .ok_or_else(|| AppError::RenderingError("Window not available".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| AppError::RenderingError("Document not available".to_string()))?;
        let pixel_ratio = normalized_pixel_ratio(window.device_pixel_ratio());

        let canvas = document
            .create_element("canvas")
            .map_err(|e| js_error("Failed to create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::RenderingError("Created element is not a canvas".to_string()))?;
        let (backing_width, backing_height) = options.backing_size(pixel_ratio);
        canvas.set_width(backing_width);
        canvas.set_height(backing_height);
        let style = format!(
            "display: block; cursor: crosshair; width: {}px; height: {}px;",
            options.width, options.height
        );
        canvas
            .set_attribute("style", &style)
            .map_err(|e| js_error("Failed to style canvas", e))?;

        self.container.append_child(&canvas).map_err(|e| js_error("Failed to attach canvas", e))?;

        let context = match Self::context_2d(&canvas) {
            Ok(context) => context,
            Err(err) => {
                canvas.remove();
                return Err(err);
            }
        };

        let state = Rc::new(RefCell::new(SurfaceState {
            context,
            series: CandleSeries::new(options.max_candles),
            theme: options.theme.clone(),
            width: options.width,
            height: options.height,
            pixel_ratio,
            layout: None,
            cursor: None,
        }));

        let mut surface = CanvasSurface { canvas, state, listeners: Vec::new(), disposed: false };
        surface.attach_crosshair();
        let initial_draw = surface.state.borrow().draw();
        if let Err(err) = initial_draw {
            surface.dispose();
            return Err(js_error("Initial draw failed", err));
        }

        log_debug!(COMPONENT, "Canvas surface created ({}x{})", options.width, options.height);
        Ok(surface)
    }
}

struct SurfaceState {
    context: CanvasRenderingContext2d,
    series: CandleSeries,
    theme: ChartTheme,
    width: u32,
    height: u32,
    /// Device pixels per CSS pixel; drawing happens in CSS pixels.
    pixel_ratio: f64,
    layout: Option<ChartLayout>,
    cursor: Option<(f64, f64)>,
}

impl SurfaceState {
    fn relayout(&mut self) {
        self.layout = ChartLayout::fit(&self.series, self.width, self.height);
    }

    fn stroke_line(&self, from: (f64, f64), to: (f64, f64)) {
        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(from.0, from.1);
        ctx.line_to(to.0, to.1);
        ctx.stroke();
    }

    fn draw(&self) -> Result<(), JsValue> {
        let ctx = &self.context;
        let (width, height) = (self.width as f64, self.height as f64);

        ctx.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0)?;
        ctx.set_fill_style_str(&self.theme.background);
        ctx.fill_rect(0.0, 0.0, width, height);
        ctx.set_font(&self.theme.font);
        ctx.set_line_width(1.0);

        let Some(layout) = self.layout else {
            return Ok(());
        };

        self.draw_grid(&layout);
        self.draw_candles(&layout);
        self.draw_axes(&layout)?;
        self.draw_crosshair(&layout)?;
        Ok(())
    }

    fn draw_grid(&self, layout: &ChartLayout) {
        self.context.set_stroke_style_str(&self.theme.grid);
        for price in layout.price_ticks(PRICE_TICKS) {
            let y = layout.y_for(price).round() + 0.5;
            self.stroke_line((0.0, y), (layout.plot_width, y));
        }
        for slot in layout.time_tick_slots() {
            let x = layout.x_for(slot).round() + 0.5;
            self.stroke_line((x, 0.0), (x, layout.plot_height));
        }
    }

    fn visible_candles<'a>(
        &'a self,
        layout: &'a ChartLayout,
    ) -> impl Iterator<Item = (usize, &'a Candle)> + 'a {
        self.series.candles().iter().skip(layout.first_visible).take(layout.visible_count).enumerate()
    }

    fn draw_candles(&self, layout: &ChartLayout) {
        let ctx = &self.context;
        for (slot, candle) in self.visible_candles(layout) {
            let geometry = layout.candle_geometry(slot, candle);
            let color = self.theme.candle_color(geometry.bullish);

            ctx.set_stroke_style_str(color);
            let wick_x = geometry.x.round() + 0.5;
            self.stroke_line((wick_x, geometry.wick_top), (wick_x, geometry.wick_bottom));

            ctx.set_fill_style_str(color);
            ctx.fill_rect(
                geometry.body_left,
                geometry.body_top,
                geometry.body_width,
                geometry.body_height,
            );
            if self.theme.body_border {
                ctx.stroke_rect(
                    geometry.body_left,
                    geometry.body_top,
                    geometry.body_width,
                    geometry.body_height,
                );
            }
        }
    }

    fn draw_axes(&self, layout: &ChartLayout) -> Result<(), JsValue> {
        let ctx = &self.context;

        ctx.set_stroke_style_str(&self.theme.axis_border);
        let border_x = layout.plot_width.round() + 0.5;
        let border_y = layout.plot_height.round() + 0.5;
        self.stroke_line((border_x, 0.0), (border_x, layout.height));
        self.stroke_line((0.0, border_y), (layout.width, border_y));

        ctx.set_fill_style_str(&self.theme.text);
        ctx.set_text_baseline("middle");
        ctx.set_text_align("left");
        for price in layout.price_ticks(PRICE_TICKS) {
            ctx.fill_text(&format_price(price), layout.plot_width + LABEL_PADDING, layout.y_for(price))?;
        }

        ctx.set_text_align("center");
        let label_y = layout.plot_height + (layout.height - layout.plot_height) / 2.0;
        for slot in layout.time_tick_slots() {
            let index = layout.series_index(slot);
            if let Some(candle) = self.series.candles().get(index) {
                ctx.fill_text(&format_time_label(candle.time.value()), layout.x_for(slot), label_y)?;
            }
        }

        if let Some(last) = self.series.latest() {
            let price = last.ohlc.close.value();
            let color = self.theme.candle_color(last.is_bullish());
            self.draw_price_marker(layout, price, color, &self.theme.background)?;
        }
        Ok(())
    }

    fn draw_price_marker(
        &self,
        layout: &ChartLayout,
        price: f64,
        fill: &str,
        text: &str,
    ) -> Result<(), JsValue> {
        let ctx = &self.context;
        let y = layout.y_for(price);
        if !(0.0..=layout.plot_height).contains(&y) {
            return Ok(());
        }
        ctx.set_fill_style_str(fill);
        ctx.fill_rect(layout.plot_width + 1.0, y - 9.0, layout.width - layout.plot_width, 18.0);
        ctx.set_fill_style_str(text);
        ctx.set_text_align("left");
        ctx.set_text_baseline("middle");
        ctx.fill_text(&format_price(price), layout.plot_width + LABEL_PADDING, y)
    }

    fn draw_crosshair(&self, layout: &ChartLayout) -> Result<(), JsValue> {
        let Some((x, y)) = self.cursor else {
            return Ok(());
        };
        if y < 0.0 || y > layout.plot_height {
            return Ok(());
        }
        let Some(slot) = layout.slot_at(x) else {
            return Ok(());
        };

        let snapped_x = layout.x_for(slot).round() + 0.5;
        self.context.set_stroke_style_str(&self.theme.crosshair);
        self.stroke_line((snapped_x, 0.0), (snapped_x, layout.plot_height));
        self.stroke_line((0.0, y), (layout.plot_width, y));

        self.draw_price_marker(layout, layout.price_at(y), &self.theme.crosshair, &self.theme.background)?;

        if let Some(candle) = self.series.candles().get(layout.series_index(slot)) {
            let ctx = &self.context;
            let label_y = layout.plot_height + (layout.height - layout.plot_height) / 2.0;
            ctx.set_fill_style_str(&self.theme.crosshair);
            ctx.fill_rect(snapped_x - 26.0, layout.plot_height + 1.0, 52.0, layout.height - layout.plot_height);
            ctx.set_fill_style_str(&self.theme.background);
            ctx.set_text_align("center");
            ctx.fill_text(&format_time_label(candle.time.value()), snapped_x, label_y)?;
        }
        Ok(())
    }
}

/// Canvas 2D chart surface with a single candlestick series.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    state: Rc<RefCell<SurfaceState>>,
    listeners: Vec<EventListener>,
    disposed: bool,
}

impl CanvasSurface {
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn attach_crosshair(&mut self) {
        let state = Rc::clone(&self.state);
        let on_move = EventListener::new(&self.canvas, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            redraw_with_cursor(&state, Some((event.offset_x() as f64, event.offset_y() as f64)));
        });

        let state = Rc::clone(&self.state);
        let on_leave = EventListener::new(&self.canvas, "mouseleave", move |_event| {
            redraw_with_cursor(&state, None);
        });

        self.listeners.push(on_move);
        self.listeners.push(on_leave);
    }
}

fn redraw_with_cursor(state: &Rc<RefCell<SurfaceState>>, cursor: Option<(f64, f64)>) {
    let Ok(mut state) = state.try_borrow_mut() else {
        return;
    };
    state.cursor = cursor;
    if let Err(err) = state.draw() {
        log_error!(COMPONENT, "❌ Crosshair redraw failed: {:?}", err);
    }
}

impl ChartSurface for CanvasSurface {
    fn update(&mut self, candle: Candle) -> Result<UpsertOutcome, AppError> {
        if self.disposed {
            return Err(AppError::RenderingError("Surface already disposed".to_string()));
        }
        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|_| AppError::RenderingError("Surface is busy".to_string()))?;

        let outcome = state.series.upsert(candle)?;
        state.relayout();
        state.draw().map_err(|e| js_error("Failed to draw chart", e))?;
        Ok(outcome)
    }

    fn fit_content(&mut self) {
        if self.disposed {
            return;
        }
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.relayout();
            if let Err(err) = state.draw() {
                log_error!(COMPONENT, "❌ Redraw after fit failed: {:?}", err);
            }
        }
    }

    fn candle_count(&self) -> usize {
        self.state.borrow().series.len()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.listeners.clear();
        self.canvas.remove();
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.series.clear();
            state.layout = None;
        }
        log_debug!(COMPONENT, "Canvas surface disposed");
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.dispose();
    }
}
