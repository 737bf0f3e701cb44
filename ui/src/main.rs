#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use qrgenie_business::BusinessConfig;
use qrgenie_ui::state::State;

#[cfg(not(target_arch = "wasm32"))]
mod alloc {
    #[global_allocator]
    static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;
}

/// The window icon is a QR code of the app name.
#[cfg(not(target_arch = "wasm32"))]
fn app_icon() -> anyhow::Result<egui::IconData> {
    use qrgenie_business::{
        GenerationRequest, QrCodeRenderer, QrRenderer as _, QrSize, RenderOptions,
    };

    let request = GenerationRequest::new("QR Genie", QrSize::Custom(64), "#000");
    let options = RenderOptions::download(&request, 1)?;
    let image = QrCodeRenderer::new().render(&request.text, &options)?;
    Ok(egui::IconData {
        rgba: image.rgba().to_vec(),
        width: image.width(),
        height: image.height(),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("egui_winit::clipboard", log::LevelFilter::Off)
        .init();

    let config = BusinessConfig::from_env().unwrap_or_else(|err| {
        log::warn!("ignoring invalid environment configuration: {err:#}");
        BusinessConfig::default()
    });

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("QR Genie")
        .with_inner_size([960.0, 720.0])
        .with_min_inner_size([360.0, 480.0]);
    match app_icon() {
        Ok(icon) => viewport = viewport.with_icon(icon),
        Err(err) => log::warn!("no window icon: {err:#}"),
    }

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "QR Genie",
        native_options,
        Box::new(move |_cc| {
            let state = State::native(config);
            Ok(Box::new(qrgenie_ui::QrGenieApp::new(state)))
        }),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("no document to mount the app in");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("egui_canvas")
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("egui_canvas is missing or not a canvas");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|_cc| {
                    let state = State::web(BusinessConfig::default());
                    Ok(Box::new(qrgenie_ui::QrGenieApp::new(state)))
                }),
            )
            .await;

        // Remove the loading text and spinner:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p> The app has crashed. See the developer console for details. </p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}
