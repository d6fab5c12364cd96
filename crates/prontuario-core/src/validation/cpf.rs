use super::{Field, ValidationError, ValidationReason};

pub const CPF_DIGITS: usize = 11;

pub fn validate_cpf(raw: &str) -> Result<String, ValidationError> {
    let digits: Vec<u32> = raw.chars().filter_map(ascii_digit).collect();
    if digits.len() != CPF_DIGITS {
        return Err(invalid(ValidationReason::WrongLength));
    }

    if digits.iter().all(|digit| *digit == digits[0]) {
        return Err(invalid(ValidationReason::RepeatedDigits));
    }

    let (first, second) = cpf_check_digits(&digits[..9]);
    if digits[9] != first || digits[10] != second {
        return Err(invalid(ValidationReason::InvalidCheckDigit));
    }

    Ok(format_cpf(&digits))
}

/// Computes both check digits for a 9-digit CPF base.
pub fn cpf_check_digits(base: &[u32]) -> (u32, u32) {
    let first = check_digit(base, 10);
    let mut extended = base.to_vec();
    extended.push(first);
    let second = check_digit(&extended, 11);
    (first, second)
}

fn check_digit(digits: &[u32], top_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((0..top_weight).rev())
        .map(|(digit, offset)| digit * (offset + 1))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn format_cpf(digits: &[u32]) -> String {
    let mut out = String::with_capacity(14);
    for (idx, digit) in digits.iter().enumerate() {
        match idx {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(char::from(b'0' + *digit as u8));
    }
    out
}

fn ascii_digit(ch: char) -> Option<u32> {
    if ch.is_ascii_digit() {
        ch.to_digit(10)
    } else {
        None
    }
}

fn invalid(reason: ValidationReason) -> ValidationError {
    ValidationError::new(Field::Cpf, reason)
}
