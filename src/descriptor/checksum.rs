// Bitcoin Dev Kit
// Written in 2020 by Alekos Filini <alekos.filini@gmail.com>
//
// Copyright (c) 2020-2021 Bitcoin Dev Kit Developers
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! Descriptor checksum
//!
//! This module contains a re-implementation of the function used by Bitcoin Core to calculate the
//! checksum of a descriptor

use crate::error::Error;

const INPUT_CHARSET: &str = "0123456789()[],'/*abcdefgh@:$%{}IJKLMNOPQRSTUVWXYZ&+-.;<=>?!^_|~ijklmnopqrstuvwxyzABCDEFGH`#\"\\ ";
const CHECKSUM_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn poly_mod(mut c: u64, val: u64) -> u64 {
    let c0 = c >> 35;
    c = ((c & 0x7ffffffff) << 5) ^ val;
    if c0 & 1 > 0 {
        c ^= 0xf5dee51989
    };
    if c0 & 2 > 0 {
        c ^= 0xa9fdca3312
    };
    if c0 & 4 > 0 {
        c ^= 0x1bab10e32d
    };
    if c0 & 8 > 0 {
        c ^= 0x3706b1677a
    };
    if c0 & 16 > 0 {
        c ^= 0x644d626ffd
    };

    c
}

/// Compute the checksum of a descriptor
pub fn get_checksum(desc: &str) -> Result<String, Error> {
    let mut c = 1;
    let mut cls = 0;
    let mut clscount = 0;
    for ch in desc.chars() {
        let pos = INPUT_CHARSET
            .find(ch)
            .ok_or(Error::InvalidDescriptorCharacter(ch))? as u64;
        c = poly_mod(c, pos & 31);
        cls = cls * 3 + (pos >> 5);
        clscount += 1;
        if clscount == 3 {
            c = poly_mod(c, cls);
            cls = 0;
            clscount = 0;
        }
    }
    if clscount > 0 {
        c = poly_mod(c, cls);
    }
    (0..8).for_each(|_| c = poly_mod(c, 0));
    c ^= 1;

    Ok((0..8)
        .map(|j| CHECKSUM_CHARSET[((c >> (5 * (7 - j))) & 31) as usize] as char)
        .collect())
}

/// Append the checksum to a descriptor
///
/// If the descriptor already ends with `#<checksum>` the checksum is verified and the descriptor
/// is returned unchanged.
pub fn append_checksum(desc: &str) -> Result<String, Error> {
    let (body, original) = match desc.rfind('#') {
        Some(pos) => (&desc[..pos], Some(&desc[pos + 1..])),
        None => (desc, None),
    };

    let checksum = get_checksum(body)?;
    match original {
        Some(original) if original != checksum => Err(Error::InvalidDescriptorChecksum),
        _ => Ok(format!("{}#{}", body, checksum)),
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_get_checksum() {
        assert_eq!(get_checksum("raw(deadbeef)").unwrap(), "89f8spxm");
    }

    #[test]
    fn test_append_checksum() {
        assert_eq!(
            append_checksum("raw(deadbeef)").unwrap(),
            "raw(deadbeef)#89f8spxm"
        );
        assert_eq!(
            append_checksum("raw(deadbeef)#89f8spxm").unwrap(),
            "raw(deadbeef)#89f8spxm"
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        assert_matches!(
            append_checksum("raw(deadbeef)#89f8spxx"),
            Err(Error::InvalidDescriptorChecksum)
        );
    }

    #[test]
    fn test_invalid_descriptor_character() {
        assert_matches!(
            get_checksum("raw(deadbeef)\u{00e8}"),
            Err(Error::InvalidDescriptorCharacter('\u{00e8}'))
        );
    }
}
