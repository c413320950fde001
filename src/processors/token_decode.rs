//! Greedy decoding of recognizer logits.
//!
//! Token `0` ends the sequence and token `t >= 1` stands for `charlist[t - 1]`.
//! A small set of tokens is masked out before the arg-max so they can never be
//! emitted.

use crate::core::constants::SUPPRESSED_CHARS;
use crate::core::errors::OCRError;
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};

/// Turns `(seq_len x vocab)` logits into text.
#[derive(Debug, Clone)]
pub struct TokenDecoder {
    charlist: Vec<String>,
    suppressed: Vec<usize>,
}

impl TokenDecoder {
    /// Creates a decoder that suppresses the tokens of the double and single quote.
    ///
    /// Their token ids are the charlist positions of `"` and `'` plus one.
    pub fn new(charlist: Vec<String>) -> Self {
        let suppressed = Self::suppressed_tokens_for(&charlist);
        Self {
            charlist,
            suppressed,
        }
    }

    /// Creates a decoder with an explicit list of suppressed token ids.
    pub fn with_suppressed_tokens(charlist: Vec<String>, suppressed: Vec<usize>) -> Self {
        Self {
            charlist,
            suppressed,
        }
    }

    /// Token ids of [`SUPPRESSED_CHARS`] in `charlist`.
    pub fn suppressed_tokens_for(charlist: &[String]) -> Vec<usize> {
        SUPPRESSED_CHARS
            .iter()
            .filter_map(|c| {
                let mut buf = [0u8; 4];
                let needle: &str = c.encode_utf8(&mut buf);
                charlist.iter().position(|token| token == needle)
            })
            .map(|pos| pos + 1)
            .collect()
    }

    /// Token ids masked before decoding.
    pub fn suppressed_tokens(&self) -> &[usize] {
        &self.suppressed
    }

    /// Number of characters in the vocabulary, excluding the end token.
    pub fn charset_len(&self) -> usize {
        self.charlist.len()
    }

    /// Decodes `[seq_len, vocab]` or `[1, seq_len, vocab]` logits.
    pub fn decode(&self, logits: ArrayViewD<'_, f32>) -> Result<String, OCRError> {
        let logits = match logits.ndim() {
            2 => logits.into_dimensionality::<Ix2>()?,
            3 if logits.shape()[0] == 1 => logits
                .index_axis_move(Axis(0), 0)
                .into_dimensionality::<Ix2>()?,
            _ => {
                return Err(OCRError::decode_error(format!(
                    "expected logits of shape [seq_len, vocab] or [1, seq_len, vocab], got {:?}",
                    logits.shape()
                )));
            }
        };
        self.decode_sequence(logits)
    }

    /// Decodes a single `[seq_len, vocab]` sequence.
    pub fn decode_sequence(&self, logits: ArrayView2<'_, f32>) -> Result<String, OCRError> {
        if logits.ncols() == 0 {
            return Err(OCRError::decode_error("logits have an empty vocabulary axis"));
        }

        let mut text = String::new();
        for (position, row) in logits.outer_iter().enumerate() {
            let mut best = None::<(usize, f32)>;
            for (token, &value) in row.iter().enumerate() {
                if self.suppressed.contains(&token) {
                    continue;
                }
                if best.is_none_or(|(_, v)| value > v) {
                    best = Some((token, value));
                }
            }

            let token = match best {
                Some((token, _)) => token,
                None => {
                    return Err(OCRError::decode_error(format!(
                        "every token is suppressed at position {position}"
                    )));
                }
            };
            if token == 0 {
                break;
            }
            let piece = self.charlist.get(token - 1).ok_or_else(|| {
                OCRError::decode_error(format!(
                    "token {token} at position {position} is outside the {}-entry charset",
                    self.charlist.len()
                ))
            })?;
            text.push_str(piece);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, Array4};

    fn reference_charlist() -> Vec<String> {
        // '"' at position 2 and '\'' at position 7 give token ids 3 and 8.
        ["あ", "い", "\"", "う", "え", "お", "か", "'", "き"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn one_hot(tokens: &[usize], vocab: usize) -> Array2<f32> {
        let mut logits = Array2::zeros((tokens.len(), vocab));
        for (i, &t) in tokens.iter().enumerate() {
            logits[[i, t]] = 10.0;
        }
        logits
    }

    #[test]
    fn test_suppressed_tokens_derived_from_charlist() {
        assert_eq!(TokenDecoder::suppressed_tokens_for(&reference_charlist()), vec![3, 8]);
        assert!(TokenDecoder::suppressed_tokens_for(&["a".to_string()]).is_empty());
    }

    #[test]
    fn test_decode_stops_at_end_token() {
        let decoder = TokenDecoder::new(reference_charlist());
        let logits = one_hot(&[1, 2, 0, 4], 10);
        assert_eq!(decoder.decode_sequence(logits.view()).unwrap(), "あい");
    }

    #[test]
    fn test_decode_without_end_token_uses_whole_sequence() {
        let decoder = TokenDecoder::new(reference_charlist());
        let logits = one_hot(&[4, 5, 6], 10);
        assert_eq!(decoder.decode_sequence(logits.view()).unwrap(), "うえお");
    }

    #[test]
    fn test_quote_tokens_are_never_emitted() {
        let decoder = TokenDecoder::new(reference_charlist());
        let mut logits = Array2::zeros((2, 10));
        logits[[0, 3]] = 50.0;
        logits[[0, 9]] = 5.0;
        logits[[1, 8]] = 50.0;
        logits[[1, 1]] = 1.0;
        let text = decoder.decode_sequence(logits.view()).unwrap();
        assert_eq!(text, "きあ");
        assert!(!text.contains('"') && !text.contains('\''));
    }

    #[test]
    fn test_ties_pick_first_maximum() {
        let decoder = TokenDecoder::new(reference_charlist());
        let mut logits = Array2::zeros((1, 10));
        logits[[0, 2]] = 4.0;
        logits[[0, 5]] = 4.0;
        assert_eq!(decoder.decode_sequence(logits.view()).unwrap(), "い");
    }

    #[test]
    fn test_token_outside_charset_is_error() {
        let decoder = TokenDecoder::new(reference_charlist());
        let logits = one_hot(&[12], 13);
        let err = decoder.decode_sequence(logits.view()).unwrap_err();
        assert!(matches!(err, OCRError::Decode { .. }));
    }

    #[test]
    fn test_decode_accepts_batch_of_one() {
        let decoder = TokenDecoder::new(reference_charlist());
        let logits = one_hot(&[7, 0], 10).insert_axis(Axis(0));
        assert_eq!(decoder.decode(logits.view().into_dyn()).unwrap(), "か");
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        let decoder = TokenDecoder::new(reference_charlist());
        let batch_of_two = Array3::<f32>::zeros((2, 3, 10));
        assert!(matches!(
            decoder.decode(batch_of_two.view().into_dyn()),
            Err(OCRError::Decode { .. })
        ));
        let four_d = Array4::<f32>::zeros((1, 1, 3, 10));
        assert!(matches!(
            decoder.decode(four_d.view().into_dyn()),
            Err(OCRError::Decode { .. })
        ));
    }

    #[test]
    fn test_explicit_suppression_override() {
        let decoder = TokenDecoder::with_suppressed_tokens(reference_charlist(), vec![1]);
        let mut logits = Array2::zeros((1, 10));
        logits[[0, 1]] = 9.0;
        logits[[0, 3]] = 2.0;
        assert_eq!(decoder.decode_sequence(logits.view()).unwrap(), "\"");
    }
}
