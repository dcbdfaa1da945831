//! Validation for genome byte code.

use alife_core::{Error, Result, MIN_INSTRUCTION_LEN};

/// Validate that `code` can seed a life with `prime_gene_length`-wide instructions
pub fn validate_code(code: &[u8], prime_gene_length: usize) -> Result<()> {
    if prime_gene_length < MIN_INSTRUCTION_LEN {
        return Err(Error::Validation(format!(
            "Instruction width {} is below the minimum of {}",
            prime_gene_length, MIN_INSTRUCTION_LEN
        )));
    }

    if code.is_empty() {
        return Err(Error::Validation("Genome code is empty".to_string()));
    }

    // The root cell decodes its context from the first instruction
    if code.len() < prime_gene_length {
        return Err(Error::Validation(format!(
            "Genome has {} bytes, the root instruction needs {}",
            code.len(),
            prime_gene_length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_code() {
        assert!(validate_code(&[], 10).is_err());
    }

    #[test]
    fn test_validate_short_code() {
        assert!(validate_code(&[1, 2, 3, 4, 5], 10).is_err());
    }

    #[test]
    fn test_validate_narrow_instructions() {
        assert!(validate_code(&[0; 20], 4).is_err());
    }

    #[test]
    fn test_validate_valid_code() {
        assert!(validate_code(&[0; 10], 10).is_ok());
        assert!(validate_code(&alife_core::DEFAULT_SEED_GENOME, 10).is_ok());
    }
}
