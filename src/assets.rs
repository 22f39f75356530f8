use image::{ImageReader, Limits, RgbaImage};
use log::debug;
use std::{
    collections::{HashMap, VecDeque},
    io::Cursor,
    sync::{Arc, LazyLock, Mutex},
    time::{Duration, Instant},
};
use thiserror::Error;

pub const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Decoded dimensions above this are refused before pixel allocation.
const MAX_DECODED_DIMENSION: u32 = 4096;
const IMAGE_CACHE_CAPACITY: usize = 64;

/// A successfully decoded remote image, shared read-only.
pub type DecodedImage = Arc<RgbaImage>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("payload exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("empty payload")]
    Empty,
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Raw byte source for image URLs. Implementations must give up after
/// `timeout` and refuse bodies larger than `max_bytes`.
pub trait ByteFetcher: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration, max_bytes: u64) -> Result<Vec<u8>, FetchError>;
}

// --- Image cache ---

/// Bounded URL -> image cache with FIFO eviction. Only successful decodes
/// are stored.
pub struct ImageCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, DecodedImage>,
    order: VecDeque<String>,
}

static SHARED_CACHE: LazyLock<Arc<ImageCache>> =
    LazyLock::new(|| Arc::new(ImageCache::with_capacity(IMAGE_CACHE_CAPACITY)));

impl ImageCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Process-wide cache used when caching is enabled in the config.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_CACHE)
    }

    pub fn get(&self, url: &str) -> Option<DecodedImage> {
        let inner = self.inner.lock().ok()?;
        inner.entries.get(url).cloned()
    }

    pub fn insert(&self, url: &str, image: DecodedImage) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.entries.insert(url.to_string(), image).is_some() {
            return;
        }
        inner.order.push_back(url.to_string());
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.entries.len())
    }
}

// --- Loader ---

/// Fetches and decodes optional remote images. Never fails: every problem
/// is logged at debug level and reported as `None`. No retries.
#[derive(Clone)]
pub struct AssetLoader {
    fetcher: Arc<dyn ByteFetcher>,
    timeout: Duration,
    max_bytes: u64,
    cache: Option<Arc<ImageCache>>,
}

impl AssetLoader {
    pub fn new(fetcher: Arc<dyn ByteFetcher>) -> Self {
        Self {
            fetcher,
            timeout: IMAGE_FETCH_TIMEOUT,
            max_bytes: MAX_IMAGE_BYTES,
            cache: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_cache(mut self, cache: Option<Arc<ImageCache>>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn load(&self, url: Option<&str>) -> Option<DecodedImage> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(url)) {
            debug!("Image cache hit: {url}");
            return Some(hit);
        }

        let started = Instant::now();
        let fetcher = Arc::clone(&self.fetcher);
        let owned_url = url.to_string();
        let (timeout, max_bytes) = (self.timeout, self.max_bytes);
        let job = tokio::task::spawn_blocking(move || {
            let bytes = fetcher.fetch(&owned_url, timeout, max_bytes)?;
            if bytes.is_empty() {
                return Err(FetchError::Empty);
            }
            if bytes.len() as u64 > max_bytes {
                return Err(FetchError::TooLarge { limit: max_bytes });
            }
            Ok(decode_image(&bytes)?)
        });

        let image = match tokio::time::timeout(timeout, job).await {
            Ok(Ok(Ok(image))) => Arc::new(image),
            Ok(Ok(Err(e))) => {
                debug!("Failed to load image {url}: {e}");
                return None;
            }
            Ok(Err(e)) => {
                debug!("Image worker for {url} did not complete: {e}");
                return None;
            }
            Err(_) => {
                debug!("Image fetch timed out after {timeout:?}: {url}");
                return None;
            }
        };

        debug!(
            "Loaded image {url} ({}x{}) in {:?}.",
            image.width(),
            image.height(),
            started.elapsed()
        );
        if let Some(cache) = &self.cache {
            cache.insert(url, Arc::clone(&image));
            debug!("Cached image {url} ({} entries).", cache.len());
        }
        Some(image)
    }
}

fn decode_image(bytes: &[u8]) -> image::ImageResult<RgbaImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODED_DIMENSION);
    limits.max_image_height = Some(MAX_DECODED_DIMENSION);
    reader.limits(limits);
    Ok(reader.decode()?.to_rgba8())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{ByteFetcher, FetchError};
    use image::{ImageFormat, RgbaImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub enum Reply {
        Bytes(Vec<u8>),
        Fail,
        Slow(Duration, Vec<u8>),
    }

    /// In-memory fetcher with canned replies per URL. Unknown URLs fail.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        replies: HashMap<String, Reply>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub fn reply(mut self, url: &str, reply: Reply) -> Self {
            self.replies.insert(url.to_string(), reply);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl ByteFetcher for ScriptedFetcher {
        fn fetch(&self, url: &str, _timeout: Duration, _max_bytes: u64) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(url.to_string());
            let bytes = match self.replies.get(url) {
                Some(Reply::Bytes(b)) => b.clone(),
                Some(Reply::Slow(delay, b)) => {
                    std::thread::sleep(*delay);
                    b.clone()
                }
                Some(Reply::Fail) | None => {
                    return Err(FetchError::Transport(format!("unreachable: {url}")));
                }
            };
            // Size limits are left to the loader.
            Ok(bytes)
        }
    }

    pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }
}
