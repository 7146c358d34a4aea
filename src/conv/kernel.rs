// Scalar 1D convolution over u32 words

use crate::error::ConfigurationError;

/// Multiply-accumulate of `kernel` against `input` in wrapping u32 arithmetic.
///
/// Reduces over `min(kernel_size, window_size)` elements, further clamped to
/// the lengths of both slices so the loop never reads past either buffer.
/// Overflow wraps modulo 2^32.
#[inline]
pub fn conv1d(kernel: &[u32], input: &[u32], kernel_size: usize, window_size: usize) -> u32 {
  let len = kernel_size.min(window_size).min(kernel.len()).min(input.len());

  kernel[..len]
    .iter()
    .zip(&input[..len])
    .fold(0u32, |acc, (&k, &x)| acc.wrapping_add(k.wrapping_mul(x)))
}

/// Convolution of the whole kernel against `window` starting at `offset`.
///
/// The bound handed to [`conv1d`] is the remaining length of the window from
/// `offset`, not the full buffer capacity. A kernel that would run past the
/// end of the window is an error.
#[inline]
pub fn conv1d_at(kernel: &[u32], window: &[u32], offset: usize) -> Result<u32, ConfigurationError> {
  let end = offset.checked_add(kernel.len());
  match end {
    Some(end) if end <= window.len() => {
      let slice = &window[offset..];
      Ok(conv1d(kernel, slice, kernel.len(), slice.len()))
    },
    _ => Err(ConfigurationError::SliceOutOfBounds {
      offset,
      len: kernel.len(),
      buffer_len: window.len(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn reference(kernel: &[u32], window: &[u32], offset: usize) -> u32 {
    let mut exact: u128 = 0;
    for i in 0..kernel.len() {
      exact += kernel[i] as u128 * window[offset + i] as u128;
    }
    exact as u32
  }

  #[test]
  fn test_small_dot_product() {
    assert_eq!(conv1d(&[1, 2, 3], &[4, 5, 6], 3, 3), 4 + 10 + 18);
  }

  #[test]
  fn test_bound_is_min_of_sizes() {
    let kernel = [1, 1, 1, 1];
    let input = [10, 20, 30, 40];
    assert_eq!(conv1d(&kernel, &input, 4, 2), 30);
    assert_eq!(conv1d(&kernel, &input, 1, 4), 10);
    assert_eq!(conv1d(&kernel, &input, 0, 4), 0);
  }

  #[test]
  fn test_never_reads_past_input() {
    // window_size claims full capacity but the slice is shorter
    let kernel = [1, 1, 1, 1];
    let input = [7, 8];
    assert_eq!(conv1d(&kernel, &input, 4, 1000), 15);
  }

  #[test]
  fn test_wraparound_matches_low_bits() {
    let kernel = [u32::MAX, u32::MAX, 0x8000_0000];
    let input = [u32::MAX, 3, 6];
    let exact: u128 = (u32::MAX as u128) * (u32::MAX as u128)
      + (u32::MAX as u128) * 3
      + 0x8000_0000u128 * 6;
    assert_eq!(conv1d(&kernel, &input, 3, 3), exact as u32);
  }

  #[test]
  fn test_conv_at_matches_reference_every_offset() {
    let kernel: Vec<u32> = (0..9).collect();
    let window: Vec<u32> = (1..=64).collect();
    for offset in 0..=(window.len() - kernel.len()) {
      assert_eq!(conv1d_at(&kernel, &window, offset).unwrap(), reference(&kernel, &window, offset));
    }
  }

  #[test]
  fn test_conv_at_rejects_tail_overrun() {
    let kernel = [1u32; 4];
    let window = [1u32; 10];
    assert!(conv1d_at(&kernel, &window, 6).is_ok());
    assert_eq!(
      conv1d_at(&kernel, &window, 7),
      Err(ConfigurationError::SliceOutOfBounds {
        offset: 7,
        len: 4,
        buffer_len: 10
      })
    );
    assert!(conv1d_at(&kernel, &window, usize::MAX).is_err());
  }
}
