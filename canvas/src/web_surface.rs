//! Canvas 2D implementation of [`Surface`].
//!
//! This module is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. Images are loaded lazily: the first
//! draw of an unknown URL starts the load and skips it, and the load callback
//! reports the image's natural size so the host can size it and redraw.

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{Point, Transform};
use crate::hit::Rect;
use crate::surface::{LineStyle, RenderError, Surface};

/// Called with `(url, natural_width, natural_height)` when a pending image finishes loading.
pub type ImageReady = Rc<dyn Fn(&str, f64, f64)>;

pub struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    image_ready: Option<ImageReady>,
}

impl WebSurface {
    /// Bind to `canvas`'s 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoContext`] if the element cannot produce one.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| canvas_err("getContext", &e))?
            .ok_or(RenderError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::NoContext)?;
        Ok(Self { canvas, ctx, images: HashMap::new(), image_ready: None })
    }

    /// Register the callback fired when a pending image becomes drawable.
    pub fn set_image_ready(&mut self, callback: ImageReady) {
        self.image_ready = Some(callback);
    }

    /// Start loading `url` and remember the element.
    fn load_image(&mut self, url: &str) -> Result<(), RenderError> {
        let img = HtmlImageElement::new().map_err(|e| canvas_err("new Image", &e))?;
        if let Some(ready) = self.image_ready.clone() {
            let (loaded, loaded_url) = (img.clone(), url.to_owned());
            let onload = Closure::<dyn FnMut()>::new(move || {
                ready(&loaded_url, f64::from(loaded.natural_width()), f64::from(loaded.natural_height()));
            });
            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        }
        let failed_url = url.to_owned();
        let onerror = Closure::<dyn FnMut()>::new(move || log::warn!("image failed to load: {failed_url}"));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
        img.set_src(url);
        self.images.insert(url.to_owned(), img);
        Ok(())
    }
}

impl Surface for WebSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn set_transform(&mut self, t: Transform) -> Result<(), RenderError> {
        self.ctx.set_transform(t.a, t.b, t.c, t.d, t.e, t.f).map_err(|e| canvas_err("setTransform", &e))
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: Point) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.ctx.line_to(p.x, p.y);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_cap(&mut self, style: LineStyle) {
        self.ctx.set_line_cap(style.as_css());
    }

    fn set_line_join(&mut self, style: LineStyle) {
        self.ctx.set_line_join(style.as_css());
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        let dash_array = js_sys::Array::new();
        for s in segments {
            dash_array.push(&JsValue::from_f64(*s));
        }
        self.ctx.set_line_dash(&dash_array).map_err(|e| canvas_err("setLineDash", &e))
    }

    fn draw_image(&mut self, url: &str, at: Point, width: f64, height: f64) -> Result<(), RenderError> {
        let Some(img) = self.images.get(url) else {
            return self.load_image(url);
        };
        if !img.complete() || img.natural_width() == 0 {
            return Ok(());
        }
        let result = if width > 0.0 && height > 0.0 {
            self.ctx.draw_image_with_html_image_element_and_dw_and_dh(img, at.x, at.y, width, height)
        } else {
            self.ctx.draw_image_with_html_image_element(img, at.x, at.y)
        };
        result.map_err(|e| canvas_err("drawImage", &e))
    }
}

fn canvas_err(call: &'static str, err: &JsValue) -> RenderError {
    RenderError::Canvas { call, message: format!("{err:?}") }
}
