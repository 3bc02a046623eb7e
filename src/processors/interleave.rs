use crate::messages::ChannelSet;

/// Merges a window into a single sample stream: mono passes through,
/// stereo becomes LRLR...
pub fn interleave(window: ChannelSet) -> Vec<f32> {
    match window {
        ChannelSet::Mono(samples) => samples,
        ChannelSet::Stereo { left, right } => {
            let mut out = Vec::with_capacity(left.len() + right.len());
            for (l, r) in left.into_iter().zip(right) {
                out.push(l);
                out.push(r);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_is_identity() {
        let block = vec![0.1, -0.5, 0.9, 0.0];
        assert_eq!(interleave(ChannelSet::mono(block.clone())), block);
    }

    #[test]
    fn stereo_alternates_left_right() {
        let left: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let right: Vec<f32> = (0..64).map(|i| -(i as f32)).collect();
        let out = interleave(ChannelSet::stereo(left.clone(), right.clone()).unwrap());

        assert_eq!(out.len(), 128);
        for k in 0..64 {
            assert_eq!(out[2 * k], left[k]);
            assert_eq!(out[2 * k + 1], right[k]);
        }
    }

    #[test]
    fn empty_stereo_window_is_empty() {
        let out = interleave(ChannelSet::stereo(Vec::new(), Vec::new()).unwrap());
        assert!(out.is_empty());
    }
}
