//! Texture loader: one path in, one texture out; a list in, a same-order list out.
//!
//! Every path of a request is decoded on its own scoped thread and the
//! results are joined in request order. The join is all-or-nothing: the
//! first failure (in request order) is returned and the rest are dropped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;

use crate::texture::TextureData;

/// Where texture bytes come from.
pub trait TextureSource: Sync {
    fn fetch(&self, path: &Path) -> Result<TextureData>;
}

/// Reads images from a directory. Absolute-looking paths (`/noise.png`) are
/// resolved against the root, the way a web server serves its public dir.
#[derive(Clone, Debug)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }
}

impl TextureSource for FileSource {
    fn fetch(&self, path: &Path) -> Result<TextureData> {
        let full = self.resolve(path);
        TextureData::load(&full)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub loaded: usize,
    pub total: usize,
}

/// Counts started and finished loads across all requests.
#[derive(Debug, Default)]
pub struct LoadingManager {
    progress: Mutex<Progress>,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn item_start(&self) {
        self.progress.lock().total += 1;
    }

    fn item_end(&self, path: &Path) {
        let Progress { loaded, total } = {
            let mut p = self.progress.lock();
            p.loaded += 1;
            *p
        };
        log::info!(
            "Loaded {} resources out of {} -> {}",
            loaded,
            total,
            path.display()
        );
    }

    pub fn progress(&self) -> Progress {
        *self.progress.lock()
    }
}

pub struct TextureLoader<S = FileSource> {
    source: S,
    manager: LoadingManager,
}

impl TextureLoader<FileSource> {
    /// Loader reading from the given asset directory.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(FileSource::new(root))
    }
}

impl<S: TextureSource> TextureLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            manager: LoadingManager::new(),
        }
    }

    pub fn manager(&self) -> &LoadingManager {
        &self.manager
    }

    /// Load one path or a list of paths.
    ///
    /// ```ignore
    /// let day = loader.load("neptune/neptune.png")?;
    /// let [matcap, noise] = loader.load(["/matcap-01.png", "/noise.png"])?;
    /// ```
    pub fn load<R: TextureRequest>(&self, request: R) -> Result<R::Output> {
        request.load_with(self)
    }

    fn load_one(&self, path: &Path) -> Result<TextureData> {
        self.manager.item_start();
        let texture = self
            .source
            .fetch(path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?;
        self.manager.item_end(path);
        Ok(texture)
    }

    fn load_all<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<Vec<TextureData>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|p| scope.spawn(move || self.load_one(p.as_ref())))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .map_err(|_| anyhow!("Texture loader thread panicked"))?
                })
                .collect()
        })
    }
}

/// A load request: a single path yields a single texture, a collection of
/// paths yields a collection of textures in the same order.
pub trait TextureRequest {
    type Output;
    fn load_with<S: TextureSource>(self, loader: &TextureLoader<S>) -> Result<Self::Output>;
}

macro_rules! single_request {
    ($($ty:ty),*) => {$(
        impl TextureRequest for $ty {
            type Output = TextureData;
            fn load_with<S: TextureSource>(self, loader: &TextureLoader<S>) -> Result<TextureData> {
                let path: &Path = self.as_ref();
                loader.load_one(path)
            }
        }
    )*};
}

single_request!(&str, &String, String, &Path, PathBuf, &PathBuf);

impl<P: AsRef<Path> + Sync> TextureRequest for &[P] {
    type Output = Vec<TextureData>;
    fn load_with<S: TextureSource>(self, loader: &TextureLoader<S>) -> Result<Self::Output> {
        loader.load_all(self)
    }
}

impl<P: AsRef<Path> + Sync> TextureRequest for Vec<P> {
    type Output = Vec<TextureData>;
    fn load_with<S: TextureSource>(self, loader: &TextureLoader<S>) -> Result<Self::Output> {
        loader.load_all(&self)
    }
}

impl<P: AsRef<Path> + Sync, const N: usize> TextureRequest for [P; N] {
    type Output = [TextureData; N];
    fn load_with<S: TextureSource>(self, loader: &TextureLoader<S>) -> Result<Self::Output> {
        loader
            .load_all(&self)?
            .try_into()
            .map_err(|_| anyhow!("Expected {} textures", N))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Fake source: the file name encodes the red channel, `slow` paths
    /// sleep so they finish after the others.
    #[derive(Default)]
    struct FakeSource {
        finished: Mutex<Vec<String>>,
    }

    impl TextureSource for FakeSource {
        fn fetch(&self, path: &Path) -> Result<TextureData> {
            let name = path.to_string_lossy().to_string();
            if name.contains("missing") {
                anyhow::bail!("no such texture");
            }
            if name.contains("slow") {
                std::thread::sleep(Duration::from_millis(60));
            }
            let red: u8 = name
                .trim_start_matches(|c: char| !c.is_ascii_digit())
                .parse()
                .unwrap_or(0);
            self.finished.lock().push(name);
            Ok(TextureData::solid([red, 0, 0, 255]))
        }
    }

    fn red(t: &TextureData) -> u8 {
        t.data[0]
    }

    #[test]
    fn list_preserves_request_order() {
        let loader = TextureLoader::new(FakeSource::default());
        let textures = loader.load(vec!["slow-1", "fast-2", "fast-3"]).unwrap();
        assert_eq!(textures.iter().map(red).collect::<Vec<_>>(), vec![1, 2, 3]);
        // the slow one really did complete last
        assert_eq!(
            loader.source.finished.lock().last().map(String::as_str),
            Some("slow-1")
        );
    }

    #[test]
    fn array_request_destructures() {
        let loader = TextureLoader::new(FakeSource::default());
        let [a, b] = loader.load(["slow-7", "fast-9"]).unwrap();
        assert_eq!((red(&a), red(&b)), (7, 9));
    }

    #[test]
    fn single_path_returns_single_texture() {
        let loader = TextureLoader::new(FakeSource::default());
        let texture: TextureData = loader.load("fast-42").unwrap();
        assert_eq!(red(&texture), 42);
    }

    #[test]
    fn any_failure_fails_the_whole_list() {
        let loader = TextureLoader::new(FakeSource::default());
        let err = loader.load(vec!["fast-1", "missing-2"]).unwrap_err();
        assert!(format!("{err:#}").contains("missing-2"));
    }

    #[test]
    fn manager_counts_progress() {
        let loader = TextureLoader::new(FakeSource::default());
        loader.load(["fast-1", "fast-2"]).unwrap();
        loader.load("fast-3").unwrap();
        assert_eq!(
            loader.manager().progress(),
            Progress {
                loaded: 3,
                total: 3
            }
        );
    }

    #[test]
    fn empty_list_loads_nothing() {
        let loader = TextureLoader::new(FakeSource::default());
        let none: Vec<&str> = Vec::new();
        assert!(loader.load(none).unwrap().is_empty());
    }

    #[test]
    fn file_source_strips_web_root() {
        let src = FileSource::new("assets");
        assert_eq!(
            src.resolve(Path::new("/noise.png")),
            PathBuf::from("assets/noise.png")
        );
        assert_eq!(
            src.resolve(Path::new("neptune/neptune.png")),
            PathBuf::from("assets/neptune/neptune.png")
        );
    }
}
