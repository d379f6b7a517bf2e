//! Background threads: catalog loading and thumbnail fetching.

use super::image::decode_image;
use image::DynamicImage;
use log::{debug, warn};
use shelf_catalog::{ParseOutcome, Source, load_bytes, load_catalog};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Result of the one-shot catalog load.
pub enum LoadEvent {
    Loaded(ParseOutcome),
    /// Error chain, outermost first.
    Failed(String),
}

/// Load and parse `source` off the UI thread.
pub fn spawn_loader(source: Source) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let event = match load_catalog(&source) {
            Ok(outcome) => LoadEvent::Loaded(outcome),
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::from(e));
                warn!("catalog load failed: {message}");
                LoadEvent::Failed(message)
            }
        };
        let _ = tx.send(event);
    });
    rx
}

/// Fetch one thumbnail; `key` is the card's image reference.
#[derive(Debug)]
pub struct ImageRequest {
    pub key: String,
    pub source: Source,
}

pub struct ImageResponse {
    pub key: String,
    /// `None` when the fetch or decode failed. Failed keys are not retried.
    pub image: Option<DynamicImage>,
}

pub fn spawn_image_worker(
    req_rx: Receiver<ImageRequest>,
    resp_tx: Sender<ImageResponse>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            debug!("fetching thumbnail {}", req.source);
            let image = match load_bytes(&req.source) {
                Ok(bytes) => {
                    let decoded = decode_image(&bytes);
                    if decoded.is_none() {
                        warn!("cannot decode thumbnail {}", req.source);
                    }
                    decoded
                }
                Err(e) => {
                    warn!("thumbnail {} unavailable: {e}", req.source);
                    None
                }
            };

            if resp_tx
                .send(ImageResponse {
                    key: req.key,
                    image,
                })
                .is_err()
            {
                break;
            }
        }
    })
}
