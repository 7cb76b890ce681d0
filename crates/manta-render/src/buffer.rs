//! Row-major pixel buffers shared between workers and presentation

use glam::UVec2;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A fixed-size, row-major buffer of `channels` values per pixel
///
/// Workers write whole columns at a time; each worker owns a disjoint
/// column range, so the lock only serializes the copy itself. Readers take a
/// shared lock or a snapshot.
#[derive(Debug)]
pub struct PixelBuffer<T> {
    width: u32,
    height: u32,
    channels: u32,
    data: RwLock<Vec<T>>,
}

impl<T: Copy + Default> PixelBuffer<T> {
    pub fn new(dimensions: UVec2, channels: u32) -> Self {
        let len = dimensions.x as usize * dimensions.y as usize * channels as usize;
        Self {
            width: dimensions.x,
            height: dimensions.y,
            channels,
            data: RwLock::new(vec![T::default(); len]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Number of values (not pixels)
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (x as usize + y as usize * self.width as usize) * self.channels as usize
    }

    /// Write column `x`, top to bottom
    ///
    /// `column` holds `height * channels` values; anything past the bottom
    /// row or outside the buffer is ignored.
    pub fn write_column(&self, x: u32, column: &[T]) {
        if x >= self.width {
            return;
        }
        let channels = self.channels as usize;
        let mut data = self.data.write();
        for (y, px) in column
            .chunks_exact(channels)
            .take(self.height as usize)
            .enumerate()
        {
            let offset = self.offset(x, y as u32);
            if let Some(dst) = data.get_mut(offset..offset + channels) {
                dst.copy_from_slice(px);
            }
        }
    }

    /// Write a single pixel
    pub fn write_pixel(&self, x: u32, y: u32, value: &[T]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        let channels = self.channels as usize;
        if let Some(dst) = self.data.write().get_mut(offset..offset + channels) {
            for (d, s) in dst.iter_mut().zip(value) {
                *d = *s;
            }
        }
    }

    /// Copy of one pixel's channels
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec<T>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        self.data
            .read()
            .get(offset..offset + self.channels as usize)
            .map(<[T]>::to_vec)
    }

    /// Shared access to the raw values
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.data.read()
    }

    /// Exclusive access to the raw values
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.data.write()
    }

    /// Copy of the raw values
    pub fn snapshot(&self) -> Vec<T> {
        self.data.read().clone()
    }

    /// Replace every value
    pub fn fill(&self, value: T) {
        self.data.write().fill(value);
    }

    /// Reset to the default value
    pub fn clear(&self) {
        self.fill(T::default());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sized_by_dimensions_and_channels() {
        let buffer = PixelBuffer::<u16>::new(UVec2::new(8, 4), 4);
        assert_eq!(buffer.len(), 8 * 4 * 4);
        assert_eq!(buffer.dimensions(), UVec2::new(8, 4));
    }

    #[test]
    fn columns_land_at_row_major_offsets() {
        let buffer = PixelBuffer::<u8>::new(UVec2::new(3, 2), 2);
        buffer.write_column(1, &[1, 2, 3, 4]);

        let data = buffer.snapshot();
        // (x + y * width) * channels
        assert_eq!(&data[2..4], &[1, 2]);
        assert_eq!(&data[8..10], &[3, 4]);
        assert_eq!(buffer.pixel(1, 1).unwrap(), vec![3, 4]);
        assert_eq!(data.iter().filter(|&&v| v != 0).count(), 4);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let buffer = PixelBuffer::<u8>::new(UVec2::new(2, 2), 1);
        buffer.write_column(5, &[9, 9]);
        buffer.write_pixel(0, 7, &[9]);
        buffer.write_column(0, &[1, 2, 3, 4]);
        assert_eq!(buffer.snapshot(), vec![1, 0, 2, 0]);
        assert!(buffer.pixel(2, 0).is_none());
    }

    #[test]
    fn clear_resets_values() {
        let buffer = PixelBuffer::<u8>::new(UVec2::new(2, 2), 1);
        buffer.fill(7);
        buffer.clear();
        assert!(buffer.snapshot().iter().all(|&v| v == 0));
    }
}
