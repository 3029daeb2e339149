//! Convenience functions for interacting with ffi calls to vulkan.
//!
//! Here be dragons. Read the comments on functions to use them correctly!

use std::{
    ffi::{CString, NulError},
    os::raw::c_char,
};

/// Build a vector of pointers to c-style strings from a slice of rust strings.
///
/// The returned pointers are only valid while the returned cstrings are
/// alive. Keep both halves of the tuple in scope until the Vulkan call which
/// consumes the pointers has returned.
pub fn to_os_ptrs(
    strings: &[String],
) -> Result<(Vec<CString>, Vec<*const c_char>), NulError> {
    let cstrings = strings
        .iter()
        .cloned()
        .map(CString::new)
        .collect::<Result<Vec<CString>, NulError>>()?;
    let ptrs = cstrings
        .iter()
        .map(|cstr| cstr.as_ptr())
        .collect::<Vec<*const c_char>>();
    Ok((cstrings, ptrs))
}

/// Read a fixed-size, nul-padded name array from a Vulkan properties struct.
///
/// Returns None when the name is not valid utf-8.
pub fn name_from_raw(raw: &[c_char]) -> Option<String> {
    let bytes: Vec<u8> = raw
        .iter()
        .map(|c| *c as u8)
        .take_while(|byte| *byte != 0)
        .collect();
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ffi::CStr;

    #[test]
    fn pointers_refer_to_the_owned_cstrings() {
        let names =
            vec!["VK_KHR_surface".to_owned(), "VK_EXT_debug_utils".to_owned()];
        let (cstrings, ptrs) = to_os_ptrs(&names).unwrap();

        assert_eq!(cstrings.len(), 2);
        let first = unsafe { CStr::from_ptr(ptrs[0]) };
        let second = unsafe { CStr::from_ptr(ptrs[1]) };
        assert_eq!(first.to_str().unwrap(), "VK_KHR_surface");
        assert_eq!(second.to_str().unwrap(), "VK_EXT_debug_utils");
    }

    #[test]
    fn interior_nul_is_an_error() {
        let names = vec!["bad\0name".to_owned()];
        assert!(to_os_ptrs(&names).is_err());
    }

    #[test]
    fn raw_names_stop_at_the_first_nul() {
        let mut raw = [0 as c_char; 16];
        for (i, byte) in b"VK_LAYER".iter().enumerate() {
            raw[i] = *byte as c_char;
        }
        assert_eq!(name_from_raw(&raw).as_deref(), Some("VK_LAYER"));
    }
}
