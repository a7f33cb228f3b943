// sRGB <-> linear lookup tables, so the mask tint blends over the image
// without dark fringes along stroke edges.

const LINEAR_STEPS: usize = 4096;

pub struct GammaLut {
    to_linear: [f32; 256],
    to_srgb: [u8; LINEAR_STEPS],
}

impl GammaLut {
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, out) in to_linear.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *out = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut to_srgb = [0u8; LINEAR_STEPS];
        for (i, out) in to_srgb.iter_mut().enumerate() {
            let l = i as f32 / (LINEAR_STEPS - 1) as f32;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *out = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    pub fn linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn srgb(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * (LINEAR_STEPS - 1) as f32).round() as usize;
        self.to_srgb[idx]
    }

    /// Mix `under` towards `over` by `t` in linear light.
    #[inline]
    pub fn mix(&self, under: u8, over: u8, t: f32) -> u8 {
        if t <= 0.0 {
            return under;
        }
        if t >= 1.0 {
            return over;
        }
        self.srgb(self.linear(under) * (1.0 - t) + self.linear(over) * t)
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_round_trip() {
        let lut = GammaLut::new();
        for v in 0..=255u8 {
            assert_eq!(lut.srgb(lut.linear(v)), v);
        }
    }

    #[test]
    fn test_mix_endpoints_and_midpoint() {
        let lut = GammaLut::new();
        assert_eq!(lut.mix(10, 200, 0.0), 10);
        assert_eq!(lut.mix(10, 200, 1.0), 200);
        // Half way between black and white in linear light is brighter than 128.
        assert!(lut.mix(0, 255, 0.5) > 180);
    }
}
