use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    Backend, Bitmap, Color, IntRect, MAX_TEXTURE_SIZE, PixelBuffer, ResourceError, Result, UVec2,
    VectorDocument,
};

/// Backend bitmap plus a generation bumped on every pixel change.
///
/// Every holder of the storage compares the generation against the one its pixel cache
/// was copied at, so a change made through one holder is seen by all of them.
pub struct BitmapStorage {
    bitmap: Box<dyn Bitmap>,
    generation: u64,
}

impl BitmapStorage {
    pub fn new(bitmap: Box<dyn Bitmap>) -> Self {
        Self {
            bitmap,
            generation: 0,
        }
    }

    pub fn bitmap(&self) -> &dyn Bitmap {
        &*self.bitmap
    }

    /// Write access; counts as a pixel change.
    pub fn bitmap_mut(&mut self) -> &mut dyn Bitmap {
        self.generation += 1;
        &mut *self.bitmap
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Write access for settings that leave pixel contents alone.
    fn settings_mut(&mut self) -> &mut dyn Bitmap {
        &mut *self.bitmap
    }
}

/// A bitmap that several textures can hold at once.
pub type SharedBitmap = Rc<RefCell<BitmapStorage>>;

pub fn shared_bitmap(bitmap: Box<dyn Bitmap>) -> SharedBitmap {
    Rc::new(RefCell::new(BitmapStorage::new(bitmap)))
}

/// Vector document plus the bitmap it was last rasterized into.
struct VectorTexture {
    path: String,
    document: Option<Rc<dyn VectorDocument>>,
    bitmap: BitmapStorage,
    size_hint: UVec2,
    autoscaling: bool,
}

impl VectorTexture {
    fn load(backend: &Backend, path: &str, bytes: &[u8]) -> Result<Self> {
        let document = match backend.vector.parse(bytes) {
            Ok(document) => Some(Rc::from(document)),
            Err(err) => {
                log::warn!("[Texture] Could not parse vector document {}: {:#}", path, err);
                None
            }
        };
        let mut texture = Self {
            path: path.to_owned(),
            document,
            bitmap: BitmapStorage::new(backend.graphics.new_bitmap()),
            size_hint: UVec2::zeros(),
            autoscaling: true,
        };
        texture.render()?;
        Ok(texture)
    }

    /// Rasterizes at the size hint, or at the document size while the hint is empty.
    fn render(&mut self) -> Result<()> {
        let Some(document) = &self.document else {
            return Ok(());
        };
        let size = if self.size_hint.x == 0 || self.size_hint.y == 0 {
            document.intrinsic_size()
        } else {
            self.size_hint
        };
        if size.x == 0 || size.y == 0 || size.x > MAX_TEXTURE_SIZE || size.y > MAX_TEXTURE_SIZE {
            return Err(ResourceError::AllocationError {
                width: size.x,
                height: size.y,
            });
        }
        let pixels = document
            .render(size.x, size.y)
            .map_err(|err| ResourceError::rasterize(&self.path, err))?;
        self.bitmap
            .bitmap_mut()
            .load_from_pixels(&pixels)
            .map_err(|err| ResourceError::rasterize(&self.path, err))
    }

    fn set_size_hint(&mut self, width: u32, height: u32) -> Result<()> {
        let hint = UVec2::new(width, height);
        if self.size_hint != hint {
            self.size_hint = hint;
            if self.autoscaling {
                self.render()?;
            }
        }
        Ok(())
    }

    /// Same document, hint and flags, rasterized into a fresh bitmap.
    fn duplicate(&self, backend: &Backend) -> Self {
        let mut bitmap = backend.graphics.new_bitmap();
        bitmap.set_smooth(self.bitmap.bitmap().is_smooth());
        bitmap.set_repeated(self.bitmap.bitmap().is_repeated());
        let mut copy = Self {
            path: self.path.clone(),
            document: self.document.clone(),
            bitmap: BitmapStorage::new(bitmap),
            size_hint: self.size_hint,
            autoscaling: self.autoscaling,
        };
        if let Err(err) = copy.render() {
            log::warn!("[Texture] {}", err);
        }
        copy
    }
}

enum Representation {
    /// Exclusively owned. Views created by copying only hold a `Weak`.
    Owned(SharedBitmap),
    Shared(SharedBitmap),
    Borrowed(Weak<RefCell<BitmapStorage>>),
    Vector(VectorTexture),
}

impl Representation {
    fn name(&self) -> &'static str {
        match self {
            Representation::Owned(_) => "owned",
            Representation::Shared(_) => "shared",
            Representation::Borrowed(_) => "borrowed",
            Representation::Vector(_) => "vector",
        }
    }
}

/// Texture value: an owned, shared or borrowed bitmap, or a rasterized vector document.
///
/// Single-pixel reads go through a lazily decoded copy of the bitmap, tagged with the
/// storage generation it was taken at and refreshed once any holder changes the pixels.
///
/// Cloning follows the view policy: a clone of an owned texture is a read-only view of
/// the source texture's bitmap, a clone of a shared texture is one more holder of the same
/// bitmap, and a clone of a vector texture re-rasterizes the same document.
pub struct Texture {
    backend: Rc<Backend>,
    repr: Representation,
    pixels: RefCell<Option<(u64, PixelBuffer)>>,
}

impl Texture {
    /// Empty owned texture.
    pub fn new(backend: Rc<Backend>) -> Self {
        let bitmap = shared_bitmap(backend.graphics.new_bitmap());
        Self::with_repr(backend, Representation::Owned(bitmap))
    }

    /// Empty texture backed by a reference-counted bitmap.
    pub fn new_shared(backend: Rc<Backend>) -> Self {
        let bitmap = shared_bitmap(backend.graphics.new_bitmap());
        Self::with_repr(backend, Representation::Shared(bitmap))
    }

    pub fn from_shared(backend: Rc<Backend>, bitmap: SharedBitmap) -> Self {
        Self::with_repr(backend, Representation::Shared(bitmap))
    }

    /// Read-only view of a bitmap owned elsewhere.
    pub fn borrowed(backend: Rc<Backend>, bitmap: &SharedBitmap) -> Self {
        Self::with_repr(backend, Representation::Borrowed(Rc::downgrade(bitmap)))
    }

    fn with_repr(backend: Rc<Backend>, repr: Representation) -> Self {
        Self {
            backend,
            repr,
            pixels: RefCell::new(None),
        }
    }

    pub fn backend(&self) -> &Rc<Backend> {
        &self.backend
    }

    fn invalidate(&mut self) {
        *self.pixels.get_mut() = None;
    }

    fn with_storage<R>(&self, f: impl FnOnce(&BitmapStorage) -> R) -> Result<R> {
        match &self.repr {
            Representation::Owned(storage) | Representation::Shared(storage) => {
                let result = f(&*storage.borrow());
                Ok(result)
            }
            Representation::Borrowed(view) => {
                let storage = view.upgrade().ok_or(ResourceError::DanglingTexture)?;
                let result = f(&*storage.borrow());
                Ok(result)
            }
            Representation::Vector(vector) => Ok(f(&vector.bitmap)),
        }
    }

    fn with_storage_mut<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut BitmapStorage) -> R,
    ) -> Result<R> {
        match &mut self.repr {
            Representation::Owned(storage) | Representation::Shared(storage) => {
                let result = f(&mut *storage.borrow_mut());
                Ok(result)
            }
            Representation::Borrowed(_) => Err(ResourceError::ReadOnlyTexture(operation)),
            Representation::Vector(vector) => Ok(f(&mut vector.bitmap)),
        }
    }

    /// Runs `f` on the active bitmap.
    pub fn with_bitmap<R>(&self, f: impl FnOnce(&dyn Bitmap) -> R) -> Result<R> {
        self.with_storage(|storage| f(storage.bitmap()))
    }

    /// Runs `f` on the active bitmap for writing. Fails on read-only views.
    pub fn with_bitmap_mut<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut dyn Bitmap) -> R,
    ) -> Result<R> {
        self.invalidate();
        self.with_storage_mut(operation, |storage| f(storage.bitmap_mut()))
    }

    fn read_or<R>(&self, fallback: R, f: impl FnOnce(&dyn Bitmap) -> R) -> R {
        self.with_bitmap(f).unwrap_or_else(|err| {
            log::warn!("[Texture] {}", err);
            fallback
        })
    }

    /// Allocates an empty `width`x`height` bitmap, discarding the current content.
    /// A vector texture becomes an owned bitmap.
    pub fn create(&mut self, width: u32, height: u32) -> Result<()> {
        self.invalidate();
        let allocation_error = |err: anyhow::Error| {
            log::debug!("[Texture] {:#}", err);
            ResourceError::AllocationError { width, height }
        };
        if let Representation::Vector(_) = self.repr {
            let mut bitmap = self.backend.graphics.new_bitmap();
            bitmap.create(width, height).map_err(allocation_error)?;
            self.repr = Representation::Owned(shared_bitmap(bitmap));
            return Ok(());
        }
        self.with_bitmap_mut("create", |bitmap| bitmap.create(width, height))?
            .map_err(allocation_error)
    }

    /// Loads an image file. Vector files switch this texture to a vector document
    /// rasterized at its natural size; check [`Texture::success`] afterwards.
    pub fn load_from_file(&mut self, path: &str) -> Result<()> {
        self.load(path, None)
    }

    /// Loads only `region` of a bitmap file. Vector files ignore the region and are
    /// rasterized whole.
    pub fn load_from_file_region(&mut self, path: &str, region: IntRect) -> Result<()> {
        self.load(path, Some(region))
    }

    fn load(&mut self, path: &str, region: Option<IntRect>) -> Result<()> {
        let bytes = self.backend.read_bytes(path).map_err(|err| {
            log::debug!("[Texture] {:#}", err);
            ResourceError::AssetNotFound {
                path: path.to_owned(),
                suggestions: Vec::new(),
            }
        })?;

        if self.backend.vector.handles(path) {
            self.invalidate();
            let vector = VectorTexture::load(&self.backend, path, &bytes)?;
            self.repr = Representation::Vector(vector);
            return Ok(());
        }

        self.write_pixels("load_from_file", path, |bitmap| match region {
            Some(region) => bitmap.load_from_region(&bytes, region),
            None => bitmap.load_from_bytes(&bytes),
        })
    }

    /// Replaces the bitmap content with `pixels`.
    pub fn load_from_image(&mut self, pixels: &PixelBuffer) -> Result<()> {
        self.write_pixels("load_from_image", "<memory>", |bitmap| {
            bitmap.load_from_pixels(pixels)
        })
    }

    fn write_pixels(
        &mut self,
        operation: &'static str,
        path: &str,
        load: impl FnOnce(&mut dyn Bitmap) -> anyhow::Result<()>,
    ) -> Result<()> {
        self.invalidate();
        if let Representation::Vector(_) = self.repr {
            let mut bitmap = self.backend.graphics.new_bitmap();
            load(&mut *bitmap).map_err(|err| ResourceError::decode(path, err))?;
            self.repr = Representation::Owned(shared_bitmap(bitmap));
            return Ok(());
        }
        self.with_bitmap_mut(operation, load)?
            .map_err(|err| ResourceError::decode(path, err))
    }

    pub fn set_anti_aliasing(&mut self, anti_aliasing: bool) -> Result<()> {
        self.with_bitmap_mut("set_anti_aliasing", |bitmap| bitmap.set_smooth(anti_aliasing))
    }

    pub fn is_anti_aliased(&self) -> bool {
        self.read_or(false, |bitmap| bitmap.is_smooth())
    }

    pub fn set_repeated(&mut self, repeated: bool) -> Result<()> {
        self.with_storage_mut("set_repeated", |storage| {
            storage.settings_mut().set_repeated(repeated)
        })
    }

    pub fn is_repeated(&self) -> bool {
        self.read_or(false, |bitmap| bitmap.is_repeated())
    }

    /// Requested rasterization size of a vector texture; no-op for bitmaps.
    pub fn set_size_hint(&mut self, width: u32, height: u32) -> Result<()> {
        if let Representation::Vector(vector) = &mut self.repr {
            *self.pixels.get_mut() = None;
            vector.set_size_hint(width, height)?;
        }
        Ok(())
    }

    pub fn size_hint(&self) -> Option<UVec2> {
        match &self.repr {
            Representation::Vector(vector) => Some(vector.size_hint),
            _ => None,
        }
    }

    pub fn set_autoscaling(&mut self, autoscaling: bool) {
        if let Representation::Vector(vector) = &mut self.repr {
            vector.autoscaling = autoscaling;
        }
    }

    pub fn is_autoscaled(&self) -> bool {
        matches!(&self.repr, Representation::Vector(vector) if vector.autoscaling)
    }

    /// Re-rasterizes a vector texture at its current hint.
    pub fn render(&mut self) -> Result<()> {
        if let Representation::Vector(vector) = &mut self.repr {
            *self.pixels.get_mut() = None;
            vector.render()?;
        }
        Ok(())
    }

    /// False only for a vector texture whose document could not be parsed.
    pub fn success(&self) -> bool {
        match &self.repr {
            Representation::Vector(vector) => vector.document.is_some(),
            _ => true,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.read_or(UVec2::zeros(), |bitmap| bitmap.size())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color> {
        let mut cache = self.pixels.borrow_mut();
        let current = self.with_storage(|storage| match cache.take() {
            Some((generation, pixels)) if generation == storage.generation() => {
                (generation, pixels)
            }
            _ => (storage.generation(), storage.bitmap().copy_to_pixel_buffer()),
        })?;
        let (_, pixels) = cache.insert(current);
        let (width, height) = pixels.dimensions();
        if x >= width || y >= height {
            return Err(ResourceError::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(*pixels.get_pixel(x, y))
    }

    /// Number of holders of the bitmap: 1 for owned and vector textures, the live count
    /// for shared ones, 0 for views.
    pub fn use_count(&self) -> usize {
        match &self.repr {
            Representation::Owned(_) | Representation::Vector(_) => 1,
            Representation::Shared(bitmap) => Rc::strong_count(bitmap),
            Representation::Borrowed(_) => 0,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.repr, Representation::Vector(_))
    }

    pub fn is_bitmap(&self) -> bool {
        !self.is_vector()
    }

    /// Back to an empty owned bitmap.
    pub fn reset(&mut self) {
        self.invalidate();
        self.repr = Representation::Owned(shared_bitmap(self.backend.graphics.new_bitmap()));
    }

    pub fn set_shared(&mut self, bitmap: SharedBitmap) {
        self.invalidate();
        self.repr = Representation::Shared(bitmap);
    }

    pub fn set_borrowed(&mut self, bitmap: &SharedBitmap) {
        self.invalidate();
        self.repr = Representation::Borrowed(Rc::downgrade(bitmap));
    }

    /// True when both textures read from the same bitmap storage.
    pub fn shares_storage_with(&self, other: &Texture) -> bool {
        self.storage() == other.storage()
    }

    fn storage(&self) -> *const () {
        match &self.repr {
            Representation::Owned(storage) | Representation::Shared(storage) => {
                Rc::as_ptr(storage) as *const ()
            }
            Representation::Borrowed(view) => view.as_ptr() as *const (),
            Representation::Vector(vector) => &vector.bitmap as *const BitmapStorage as *const (),
        }
    }

    pub fn make_texture_part(&self) -> TexturePart<'_> {
        TexturePart::new(self, IntRect::from_size(self.size()))
    }
}

impl Clone for Texture {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Representation::Owned(bitmap) => Representation::Borrowed(Rc::downgrade(bitmap)),
            Representation::Shared(bitmap) => Representation::Shared(bitmap.clone()),
            Representation::Borrowed(view) => Representation::Borrowed(view.clone()),
            Representation::Vector(vector) => {
                Representation::Vector(vector.duplicate(&self.backend))
            }
        };
        Self::with_repr(self.backend.clone(), repr)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("representation", &self.repr.name())
            .field("size", &self.size())
            .field("use_count", &self.use_count())
            .finish()
    }
}

/// Region of a texture, without copying pixels.
#[derive(Debug, Clone, Copy)]
pub struct TexturePart<'a> {
    texture: &'a Texture,
    rect: IntRect,
}

impl<'a> TexturePart<'a> {
    pub fn new(texture: &'a Texture, rect: IntRect) -> Self {
        Self { texture, rect }
    }

    pub fn texture(&self) -> &'a Texture {
        self.texture
    }

    pub fn rect(&self) -> &IntRect {
        &self.rect
    }

    pub fn size(&self) -> UVec2 {
        self.rect.size
    }
}
