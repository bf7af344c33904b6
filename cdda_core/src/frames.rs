/*!
# CDDA: Frame Reads
*/

use crate::{
	BYTES_PER_FRAME,
	CddaError,
	DeviceReader,
};
use std::ops::Range;



/// # Large Batch.
///
/// Failed reads of at least this many frames fall back to `SMALL_BATCH`.
const LARGE_BATCH: u32 = 32;

/// # Small Batch.
const SMALL_BATCH: u32 = 8;



#[derive(Debug, Clone)]
/// # Frame Cache.
///
/// A reusable read-ahead buffer for [`read_cdda_data`], holding whole frames
/// along with the (absolute) byte offset of the first one.
///
/// Each open track or file handle should have its own.
pub struct FrameCache {
	/// # Buffer.
	buf: Vec<u8>,

	/// # Byte Offset.
	offset: u64,

	/// # Valid Length.
	len: usize,
}

impl FrameCache {
	#[must_use]
	/// # New.
	///
	/// Create an empty cache big enough for `frames` frames (at least one).
	pub fn new(frames: u32) -> Self {
		let frames = usize::try_from(frames.max(1)).unwrap_or(1);
		Self {
			buf: vec![0; frames * usize::from(BYTES_PER_FRAME)],
			offset: 0,
			len: 0,
		}
	}

	#[must_use]
	/// # Capacity (Frames).
	pub fn frames(&self) -> u32 {
		u32::try_from(self.buf.len().wrapping_div(usize::from(BYTES_PER_FRAME)))
			.unwrap_or(u32::MAX)
	}

	#[must_use]
	/// # Byte Offset.
	///
	/// Return the absolute byte offset of the cached data.
	pub const fn offset(&self) -> u64 { self.offset }

	#[must_use]
	/// # Length.
	///
	/// Return the number of valid cached bytes.
	pub const fn len(&self) -> usize { self.len }

	#[must_use]
	/// # Is Empty?
	pub const fn is_empty(&self) -> bool { self.len == 0 }

	#[must_use]
	/// # Cached Range.
	///
	/// Return the absolute byte range of the cached data.
	pub const fn range(&self) -> Range<u64> {
		self.offset..self.offset + self.len as u64
	}

	/// # Clear.
	///
	/// Forget the cached data.
	pub fn clear(&mut self) { self.len = 0; }

	/// # Fill.
	///
	/// Read `count` frames from `first_frame` into the buffer, replacing
	/// whatever was there.
	fn fill<D: DeviceReader>(&mut self, dev: &mut D, first_frame: u32, count: u32)
	-> Result<(), CddaError> {
		self.len = 0;
		read_frames(dev, first_frame, &mut self.buf, count)?;
		self.offset = u64::from(first_frame) * u64::from(BYTES_PER_FRAME);
		self.len = usize::try_from(count).map_err(|_| CddaError::ReadRange)? *
			usize::from(BYTES_PER_FRAME);
		Ok(())
	}

	#[cfg(test)]
	/// # Prime.
	///
	/// Pretend `data` was read from `offset`.
	pub(crate) fn prime(&mut self, offset: u64, data: &[u8]) {
		self.buf[..data.len()].copy_from_slice(data);
		self.offset = offset;
		self.len = data.len();
	}
}



/// # Read Frames.
///
/// Read `frame_count` frames starting at `first_frame` into `buf`.
///
/// Reads are issued in batches as large as possible. If one fails, the batch
/// size drops to eight (if it was at least 32), or else to one. A failed
/// single-frame read is fatal.
///
/// ## Errors
///
/// This will return an error if the buffer is too small, or if a
/// single-frame read fails.
pub fn read_frames<D: DeviceReader>(
	dev: &mut D,
	mut first_frame: u32,
	buf: &mut [u8],
	frame_count: u32,
) -> Result<(), CddaError> {
	let frame_size = usize::from(BYTES_PER_FRAME);
	let total = usize::try_from(frame_count).ok()
		.and_then(|n| n.checked_mul(frame_size))
		.filter(|n| *n <= buf.len())
		.ok_or(CddaError::ReadRange)?;

	let mut left = frame_count;
	let mut batch = frame_count;
	let mut buf = &mut buf[..total];
	while left != 0 {
		batch = batch.min(left);
		let len = usize::try_from(batch).map_err(|_| CddaError::ReadRange)? * frame_size;

		if dev.read_frames_raw(first_frame, batch, &mut buf[..len]).is_ok() {
			buf = &mut std::mem::take(&mut buf)[len..];
			first_frame += batch;
			left -= batch;
		}
		else if batch == 1 { return Err(CddaError::CdReadFrame(first_frame)); }
		else if LARGE_BATCH <= batch { batch = SMALL_BATCH; }
		else { batch = 1; }
	}

	Ok(())
}

/// # Read CDDA Data.
///
/// Copy the audio bytes starting at absolute byte `offset` into `dst`,
/// reading frames through `cache` as needed. Frames at or beyond `end_frame`
/// are never read.
///
/// If the cache already holds the start or the end of the request, that
/// part is copied over directly.
///
/// ## Errors
///
/// This will return an error if the request extends past `end_frame`, or
/// if the frames cannot be read.
pub fn read_cdda_data<D: DeviceReader>(
	dev: &mut D,
	end_frame: u32,
	mut offset: u64,
	mut dst: &mut [u8],
	cache: &mut FrameCache,
) -> Result<(), CddaError> {
	let frame_size = u64::from(BYTES_PER_FRAME);
	let end = u64::try_from(dst.len()).ok()
		.and_then(|len| offset.checked_add(len))
		.filter(|e| *e <= u64::from(end_frame) * frame_size)
		.ok_or(CddaError::ReadRange)?;
	if dst.is_empty() { return Ok(()); }

	// The start is cached.
	let cached = cache.range();
	if cached.contains(&offset) {
		let from = usize::try_from(offset - cached.start).map_err(|_| CddaError::ReadRange)?;
		let len = dst.len().min(cache.len - from);
		dst[..len].copy_from_slice(&cache.buf[from..from + len]);
		dst = &mut std::mem::take(&mut dst)[len..];
		offset += len as u64;
	}
	// The end is cached.
	else if offset < cached.start && cached.start < end && end <= cached.end {
		let len = usize::try_from(end - cached.start).map_err(|_| CddaError::ReadRange)?;
		let split = dst.len() - len;
		dst[split..].copy_from_slice(&cache.buf[..len]);
		dst = &mut std::mem::take(&mut dst)[..split];
	}

	if dst.is_empty() { return Ok(()); }

	// Read the rest.
	let mut frame = u32::try_from(offset.wrapping_div(frame_size))
		.map_err(|_| CddaError::ReadRange)?;
	let mut skip = usize::try_from(offset % frame_size).map_err(|_| CddaError::ReadRange)?;
	let mut frames = u32::try_from((skip + dst.len()).div_ceil(usize::from(BYTES_PER_FRAME)))
		.map_err(|_| CddaError::ReadRange)?;

	while ! dst.is_empty() {
		let count = cache.frames()
			.min(frames)
			.min(end_frame.saturating_sub(frame));
		if count == 0 { return Err(CddaError::ReadRange); }

		cache.fill(dev, frame, count)?;
		let len = (cache.len - skip).min(dst.len());
		dst[..len].copy_from_slice(&cache.buf[skip..skip + len]);
		dst = &mut std::mem::take(&mut dst)[len..];

		frame += count;
		frames -= count;
		skip = 0;
	}

	Ok(())
}
