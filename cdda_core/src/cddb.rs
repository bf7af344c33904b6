/*!
# CDDA: CDDB
*/

use crate::Toc;
use std::fmt;



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # CDDB ID.
///
/// This is a simple wrapper for FreeDB/CDDB disc IDs that ensures consistent
/// formatting (eight lowercase hex digits).
pub struct Cddb(u32);

impl fmt::Display for Cddb {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:08x}", self.0)
	}
}

impl From<&Toc> for Cddb {
	#[inline]
	fn from(src: &Toc) -> Self { Self(compute_cddb_disc_id(src)) }
}

impl From<Cddb> for u32 {
	#[inline]
	fn from(src: Cddb) -> Self { src.0 }
}

impl Cddb {
	#[must_use]
	/// # As U32.
	pub const fn get(self) -> u32 { self.0 }
}



#[must_use]
/// # Compute CDDB Disc ID.
///
/// The layout, from high byte to low, is:
/// * The sum of the digits of each track's start time (in seconds), mod 255;
/// * The total playing time (in seconds), filling two bytes;
/// * The number of tracks.
///
/// Data tracks count too.
pub fn compute_cddb_disc_id(toc: &Toc) -> u32 {
	let tracks = toc.tracks();
	let sum: u32 = tracks.iter()
		.map(|t| digit_sum(t.start().to_seconds()))
		.fold(0, u32::wrapping_add);

	let first = tracks.first().map_or(0, |t| t.start().to_seconds());
	let total = toc.leadout().start().to_seconds().wrapping_sub(first);

	((sum % 255) << 24) | (total << 8) | u32::from(toc.track_count())
}

/// # Digit Sum.
///
/// Add up the decimal digits of `n`.
const fn digit_sum(mut n: u32) -> u32 {
	let mut out = 0;
	while n != 0 {
		out += n % 10;
		n = n.wrapping_div(10);
	}
	out
}
