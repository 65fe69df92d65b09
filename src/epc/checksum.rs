//! GS1 mod-10 check digit.

/// Computes the GS1 check digit for a string of decimal digits.
///
/// Weights alternate 3, 1, 3, ... starting from the rightmost digit; the
/// check digit is `(10 - sum % 10) % 10`. Appending it to the body yields a
/// number whose weighted sum is divisible by 10.
///
/// The caller guarantees `body` contains only ASCII digits.
pub fn gs1_check_digit(body: &str) -> u8 {
    let sum: u32 = body
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_gtin13_bodies() {
        // Published GS1 examples.
        assert_eq!(gs1_check_digit("0614141812345"), 6);
        assert_eq!(gs1_check_digit("400638133393"), 1);
        assert_eq!(gs1_check_digit("629104150021"), 3);
    }

    #[test]
    fn all_zero_body_checks_to_zero() {
        assert_eq!(gs1_check_digit("0000000000000"), 0);
    }

    #[test]
    fn appended_digit_satisfies_the_identity() {
        for body in ["0614141812345", "1234567890123", "9999999999999"] {
            let check = gs1_check_digit(body);
            let full = format!("{body}{check}");
            // Weighted sum over the 14-digit string, weights 1,3,1,3,...
            // from the right (the check digit itself carries weight 1).
            let sum: u32 = full
                .bytes()
                .rev()
                .enumerate()
                .map(|(i, b)| {
                    let digit = u32::from(b - b'0');
                    if i % 2 == 1 {
                        digit * 3
                    } else {
                        digit
                    }
                })
                .sum();
            assert_eq!(sum % 10, 0, "body {body}");
        }
    }
}
