use anyhow::Result;
use data_encoding::BASE64;

pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let input_byte = input.as_bytes();
    let mut output = vec![0u8; BASE64.decode_len(input_byte.len())?];
    let len = BASE64.decode_mut(input_byte, &mut output).map_err(|partial| partial.error)?;
    output.truncate(len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("/9j/").unwrap(), vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(decode_base64("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_base64("AQ==").unwrap(), vec![1]);
        assert!(decode_base64("A").is_err());
        assert!(decode_base64("A!==").is_err());
    }
}
