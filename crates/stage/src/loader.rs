use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

/// Decoded background image, reduced to luminance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    src: String,
    width: u32,
    height: u32,
    luma: Vec<u8>,
}

impl LoadedImage {
    pub fn new(src: impl Into<String>, width: u32, height: u32, luma: Vec<u8>) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            luma,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major luminance samples, `width * height` long.
    pub fn luma(&self) -> &[u8] {
        &self.luma
    }

    /// Luminance at `(x, y)` in `[0, 1]`, or `None` outside the image.
    pub fn sample(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.luma.get(idx).map(|v| f32::from(*v) / 255.0)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load image '{src}': {reason}")]
    Decode { src: String, reason: String },
    #[error("image '{src}' did not load within {timeout:?}")]
    TimedOut { src: String, timeout: Duration },
    #[error("image loader for '{src}' disconnected before returning a result")]
    Disconnected { src: String },
}

/// Pending single-shot image load.
pub enum ImageRequest {
    Ready(Result<Arc<LoadedImage>, LoadError>),
    Pending {
        src: String,
        receiver: Receiver<Result<LoadedImage, LoadError>>,
    },
}

impl ImageRequest {
    pub fn ready(result: Result<LoadedImage, LoadError>) -> Self {
        ImageRequest::Ready(result.map(Arc::new))
    }

    /// A request completed later through the returned sender.
    pub fn channel(src: impl Into<String>) -> (Sender<Result<LoadedImage, LoadError>>, Self) {
        let (sender, receiver) = bounded(1);
        (
            sender,
            ImageRequest::Pending {
                src: src.into(),
                receiver,
            },
        )
    }

    /// `Ok(None)` while the load is still in flight.
    pub fn poll(&mut self) -> Result<Option<Arc<LoadedImage>>, LoadError> {
        match self {
            ImageRequest::Ready(result) => result.clone().map(Some),
            ImageRequest::Pending { src, receiver } => match receiver.try_recv() {
                Ok(result) => {
                    let result = result.map(Arc::new);
                    let polled = result.clone().map(Some);
                    *self = ImageRequest::Ready(result);
                    polled
                }
                Err(TryRecvError::Empty) => Ok(None),
                Err(TryRecvError::Disconnected) => {
                    let err = LoadError::Disconnected { src: src.clone() };
                    *self = ImageRequest::Ready(Err(err.clone()));
                    Err(err)
                }
            },
        }
    }
}

/// Starts asynchronous image loads.
pub trait ImageLoader {
    fn request(&self, src: &str) -> ImageRequest;
}

/// Decodes images from disk on a worker thread.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ImageLoader for FsImageLoader {
    fn request(&self, src: &str) -> ImageRequest {
        let path = self.resolve(src);
        let (sender, request) = ImageRequest::channel(src);
        let src = src.to_string();
        thread::spawn(move || {
            let result = decode(&src, &path);
            // The controller may have moved on to a newer reload.
            let _ = sender.send(result);
        });
        request
    }
}

fn decode(src: &str, path: &Path) -> Result<LoadedImage, LoadError> {
    debug!(path = %path.display(), "decoding background image");
    let image = image::open(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "background image failed to load");
        LoadError::Decode {
            src: src.to_string(),
            reason: err.to_string(),
        }
    })?;
    let luma = image.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(LoadedImage::new(src, width, height, luma.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn wait_for(request: &mut ImageRequest) -> Result<Arc<LoadedImage>, LoadError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(image) = request.poll()? {
                return Ok(image);
            }
            assert!(Instant::now() < deadline, "image load did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn channel_request_completes_once_sent() {
        let (sender, mut request) = ImageRequest::channel("maps/a.jpg");
        assert!(request.poll().unwrap().is_none());
        sender
            .send(Ok(LoadedImage::new("maps/a.jpg", 1, 1, vec![255])))
            .unwrap();
        let image = request.poll().unwrap().expect("loaded");
        assert_eq!(image.sample(0, 0), Some(1.0));
        assert!(request.poll().unwrap().is_some());
    }

    #[test]
    fn dropped_sender_reports_disconnect() {
        let (sender, mut request) = ImageRequest::channel("maps/b.jpg");
        drop(sender);
        assert!(matches!(
            request.poll(),
            Err(LoadError::Disconnected { .. })
        ));
    }

    #[test]
    fn decodes_png_from_root() {
        let dir = tempfile::TempDir::new().unwrap();
        fs_write_png(&dir.path().join("tiny.png"));
        let loader = FsImageLoader::new(dir.path());
        let mut request = loader.request("tiny.png");
        let image = wait_for(&mut request).unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.luma().len(), 2);
        assert_eq!(image.sample(0, 0), Some(0.0));
        assert_eq!(image.sample(1, 0), Some(1.0));
        assert_eq!(image.sample(2, 0), None);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let loader = FsImageLoader::new(dir.path());
        let mut request = loader.request("maps/missing.jpg");
        assert!(matches!(
            wait_for(&mut request),
            Err(LoadError::Decode { .. })
        ));
    }

    fn fs_write_png(path: &Path) {
        let img = image::GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        img.save(path).unwrap();
    }
}
