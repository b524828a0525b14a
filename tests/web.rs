#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use backdrop_wasm::{Backdrop, CanvasSurface, DrawingSurface, LocalStorage, PreferenceStore};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mounted_canvas(width: u32, height: u32) -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas
        .set_attribute(
            "style",
            &format!("display:block;width:{width}px;height:{height}px"),
        )
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn detached_canvas_has_no_bounds() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    let surface = CanvasSurface::new(canvas).unwrap();
    assert!(surface.bounds().is_none());
}

#[wasm_bindgen_test]
fn canvas_surface_scales_by_pixel_ratio() {
    let canvas = mounted_canvas(120, 80);
    let mut surface = CanvasSurface::new(canvas.clone()).unwrap();

    let (w, h) = surface.bounds().expect("mounted canvas has bounds");
    assert!(w > 0.0 && h > 0.0);

    let ratio = surface.device_pixel_ratio();
    surface.set_pixel_size((w * ratio) as u32, (h * ratio) as u32);
    surface.reset_transform(ratio);
    assert_eq!(canvas.width(), (w * ratio) as u32);
    assert_eq!(canvas.height(), (h * ratio) as u32);

    canvas.remove();
}

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let Some(mut store) = LocalStorage::open() else {
        return;
    };
    store.set("backdrop-test", "starfield").unwrap();
    assert_eq!(store.get("backdrop-test").as_deref(), Some("starfield"));
    assert_eq!(store.get("backdrop-test-missing"), None);
}

#[wasm_bindgen_test]
fn callbacks_may_call_back_into_backdrop() {
    let canvas = mounted_canvas(160, 90);
    let handle: Rc<RefCell<Option<Rc<Backdrop>>>> = Rc::default();
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();

    let reinit = {
        let handle = handle.clone();
        let seen = seen.clone();
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_visualizer, _size| {
            if let Some(backdrop) = handle.borrow().as_ref() {
                seen.borrow_mut().push(backdrop.current());
                backdrop.restart();
            }
        })
    };
    let backdrop = Rc::new(
        Backdrop::new(
            canvas.clone(),
            Function::new_no_args(""),
            reinit.as_ref().unchecked_ref::<Function>().clone(),
            None,
        )
        .unwrap(),
    );
    *handle.borrow_mut() = Some(backdrop.clone());

    backdrop.start().unwrap();
    assert_eq!(*seen.borrow(), vec![backdrop.current()]);

    backdrop.destroy();
    handle.borrow_mut().take();
    canvas.remove();
}

#[wasm_bindgen_test]
fn toggle_appearance_updates_root_element() {
    let canvas = mounted_canvas(40, 40);
    let backdrop = Backdrop::new(
        canvas.clone(),
        Function::new_no_args(""),
        Function::new_no_args(""),
        None,
    )
    .unwrap();
    let root = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .document_element()
        .unwrap();

    for _ in 0..2 {
        backdrop.toggle_appearance();
        assert_eq!(
            root.class_list().contains("light"),
            backdrop.appearance() == "light"
        );
        assert_eq!(root.get_attribute("data-theme"), Some(backdrop.theme()));
    }
    canvas.remove();
}
