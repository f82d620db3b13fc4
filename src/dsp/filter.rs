use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Five-coefficient IIR
====================

One structure serves all four responses. Only the coefficients differ.

| response  | constructor          | passes           | rejects          |
| --------- | -------------------- | ---------------- | ---------------- |
| low-pass  | `Iir::lopass(f)`     | below f          | above f          |
| high-pass | `Iir::hipass(f)`     | above f          | below f          |
| band-pass | `Iir::bandpass(f,w)` | f ± w/2          | everything else  |
| notch     | `Iir::notch(f,w)`    | everything else  | f ± w/2          |

Frequencies and widths are normalized: hz / sample rate.

Low/high-pass are single-pole-pair Chebyshev designs. Band-pass and notch are
the classic resonator pair where r = 1 - 3w sets the bandwidth.

Per sample:

    s2 = s1; s1 = s0; s0 = in
    out = s0*c0 + s1*c1 + s2*c2 + s3*c3 + s4*c4
    s4 = s3; s3 = out
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Iir {
    coef: [f32; 5],
    #[cfg_attr(feature = "serde", serde(skip))]
    state: [f32; 5],
}

struct Prototype {
    x0: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    d: f32,
}

fn chebyshev_prototype() -> Prototype {
    let rp = -(PI / 2.0).cos();
    let ip = (PI / 2.0).sin();
    let t = 2.0 * 0.5f32.tan();
    let m = rp * rp + ip * ip;
    let d = 4.0 - 4.0 * rp * t + m * t * t;
    Prototype {
        x0: (t * t) / d,
        x1: (2.0 * t * t) / d,
        x2: (t * t) / d,
        y1: (8.0 - 2.0 * m * t * t) / d,
        y2: (-4.0 - 4.0 * rp * t - m * t * t) / d,
        d,
    }
}

fn chebyshev(k: f32, invert: f32) -> [f32; 5] {
    let Prototype { x0, x1, x2, y1, y2, d } = chebyshev_prototype();
    [
        invert * (x0 - x1 * k + x2 * k * k) / d,
        (-2.0 * x0 * k + x1 + x1 * k * k - 2.0 * x2 * k) / d,
        (x0 * k * k - x1 * k + x2) / d,
        invert * (2.0 * k + y1 + y1 * k * k - 2.0 * y2 * k) / d,
        (-k * k - y1 * k + y2) / d,
    ]
}

fn resonator(freq: f32, width: f32) -> (f32, f32, f32) {
    let r = 1.0 - 3.0 * width;
    let cosfreq = (PI * 2.0 * freq).cos();
    let k = (1.0 - 2.0 * r * cosfreq + r * r) / (2.0 - 2.0 * cosfreq);
    (r, cosfreq, k)
}

impl Iir {
    pub fn from_coefficients(coef: [f32; 5]) -> Self {
        Self {
            coef,
            state: [0.0; 5],
        }
    }

    pub fn lopass(freq: f32) -> Self {
        let w = 2.0 * PI * freq;
        let k = (0.5 - w / 2.0).sin() / (0.5 + w / 2.0).sin();
        Self::from_coefficients(chebyshev(k, 1.0))
    }

    pub fn hipass(freq: f32) -> Self {
        let w = 2.0 * PI * freq;
        let k = -(w / 2.0 + 0.5).cos() / (w / 2.0 - 0.5).cos();
        Self::from_coefficients(chebyshev(k, -1.0))
    }

    pub fn bandpass(freq: f32, width: f32) -> Self {
        let (r, cosfreq, k) = resonator(freq, width);
        Self::from_coefficients([
            1.0 - k,
            2.0 * (k - r) * cosfreq,
            r * r - k,
            2.0 * r * cosfreq,
            -r * r,
        ])
    }

    pub fn notch(freq: f32, width: f32) -> Self {
        let (r, cosfreq, k) = resonator(freq, width);
        Self::from_coefficients([k, -2.0 * k * cosfreq, k, 2.0 * r * cosfreq, -r * r])
    }

    pub fn coefficients(&self) -> &[f32; 5] {
        &self.coef
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let s = &mut self.state;
        s[2] = s[1];
        s[1] = s[0];
        s[0] = input;
        let c = &self.coef;
        let out = s[0] * c[0] + s[1] * c[1] + s[2] * c[2] + s[3] * c[3] + s[4] * c[4];
        s[4] = s[3];
        s[3] = out;
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 5];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 44_100.0;

    fn sine_rms(filter: &mut Iir, hz: f32) -> f32 {
        let frames = 8192;
        let mut sum = 0.0;
        for i in 0..frames {
            let x = (2.0 * PI * hz * i as f32 / RATE).sin();
            let y = filter.process(x);
            // Skip the settling period.
            if i >= frames / 2 {
                sum += y * y;
            }
        }
        (sum / (frames / 2) as f32).sqrt()
    }

    #[test]
    fn process_is_linear_combination_of_history() {
        let mut filter = Iir::from_coefficients([1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(filter.process(0.25), 0.25);

        let mut delay2 = Iir::from_coefficients([0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(delay2.process(1.0), 0.0);
        assert_eq!(delay2.process(0.0), 0.0);
        assert_eq!(delay2.process(0.0), 1.0);

        let mut feedback = Iir::from_coefficients([1.0, 0.0, 0.0, 0.5, 0.0]);
        assert_eq!(feedback.process(1.0), 1.0);
        assert_eq!(feedback.process(0.0), 0.5);
        assert_eq!(feedback.process(0.0), 0.25);
    }

    #[test]
    fn bandpass_favors_center() {
        let center = 1000.0 / RATE;
        let width = 100.0 / RATE;
        let on = sine_rms(&mut Iir::bandpass(center, width), 1000.0);
        let off = sine_rms(&mut Iir::bandpass(center, width), 8000.0);
        assert!(on > off * 4.0, "on {on} off {off}");
    }

    #[test]
    fn notch_rejects_center() {
        let center = 1000.0 / RATE;
        let width = 100.0 / RATE;
        let on = sine_rms(&mut Iir::notch(center, width), 1000.0);
        let off = sine_rms(&mut Iir::notch(center, width), 8000.0);
        assert!(off > on * 4.0, "on {on} off {off}");
    }

    #[test]
    fn reset_clears_history() {
        let mut filter = Iir::bandpass(0.02, 0.001);
        for _ in 0..32 {
            filter.process(1.0);
        }
        filter.reset();
        let mut fresh = Iir::bandpass(0.02, 0.001);
        assert_eq!(filter.process(0.5), fresh.process(0.5));
    }

    #[test]
    fn hipass_mirrors_lopass_signs() {
        let lo = Iir::lopass(0.1);
        let hi = Iir::hipass(0.1);
        assert!(lo.coefficients().iter().all(|c| c.is_finite()));
        assert!(hi.coefficients().iter().all(|c| c.is_finite()));
        assert_ne!(lo.coefficients(), hi.coefficients());
    }
}
