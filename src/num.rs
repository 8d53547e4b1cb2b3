// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Number formatting helpers for G-code output.

/// Format a number without trailing fractional zeros (`0.400` -> `0.4`,
/// `2.0` -> `2`). Integer digits are never trimmed.
pub fn show_fewest(n: f64) -> String {
    let mut s = format!("{}", n);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Round to `places` decimal places, halves away from zero (so 2.5 -> 3,
/// unlike banker's rounding).
pub fn round_nearest(x: f64, places: u32) -> f64 {
    let multiplier = 10f64.powi(places as i32);
    (x * multiplier).round() / multiplier
}

/// Split a duration into whole hours, minutes and rounded seconds.
pub fn hms(seconds: f64) -> (u64, u64, u64) {
    let total = seconds.max(0.).round() as u64;
    (total / 3600, total % 3600 / 60, total % 60)
}

/// A compact duration such as `1h2m3s`.
pub fn hms_message(seconds: f64) -> String {
    let (h, m, s) = hms(seconds);
    format!("{}h{}m{}s", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_fewest() {
        assert_eq!(show_fewest(0.4), "0.4");
        assert_eq!(show_fewest(2.0), "2");
        assert_eq!(show_fewest(100.0), "100");
        assert_eq!(show_fewest(-0.0), "0");
        assert_eq!(show_fewest(27.781), "27.781");
    }

    #[test]
    fn test_round_nearest() {
        assert_eq!(round_nearest(2.5, 0), 3.0);
        assert_eq!(round_nearest(-2.5, 0), -3.0);
        assert_eq!(round_nearest(0.123456, 5), 0.12346);
        assert_eq!(show_fewest(round_nearest(0.4, 5)), "0.4");
    }

    #[test]
    fn test_hms() {
        assert_eq!(hms(3723.4), (1, 2, 3));
        assert_eq!(hms(59.6), (0, 1, 0));
        assert_eq!(hms_message(3723.0), "1h2m3s");
    }
}
