//! The null-terminated array of NUL-terminated strings consumed by exec.

use std::ffi::{c_char, CString};
use std::ptr;

/// A container which owns a list of C strings and exposes a null-terminated
/// array of pointers to them, appropriate for argv.
pub struct OwningNullTerminatedArray {
    // The pointers reference the strings' heap buffers, which stay put even
    // if the slice itself is moved.
    strings: Box<[CString]>,
    pointers: Box<[*const c_char]>,
}

impl OwningNullTerminatedArray {
    /// Construct, taking ownership of a list of strings.
    pub fn new(strs: Vec<CString>) -> Self {
        let strings = strs.into_boxed_slice();
        let mut pointers = Vec::with_capacity(strings.len() + 1);
        pointers.extend(strings.iter().map(|s| s.as_ptr()));
        pointers.push(ptr::null());
        OwningNullTerminatedArray {
            strings,
            pointers: pointers.into_boxed_slice(),
        }
    }

    /// Return the argv pointer. Callers may not modify the string contents.
    pub fn get(&self) -> *const *const c_char {
        debug_assert!(
            self.pointers.last().is_some_and(|p| p.is_null()),
            "Should have null terminator"
        );
        self.pointers.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CString> {
        self.strings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::OwningNullTerminatedArray;
    use std::ffi::{CStr, CString};
    use std::ptr;

    #[test]
    fn test_owning_null_terminated_array() {
        let owned_strs = vec![
            CString::new("echo").unwrap(),
            CString::new("hi").unwrap(),
        ];
        let arr = OwningNullTerminatedArray::new(owned_strs);
        let ptr = arr.get();
        unsafe {
            assert_eq!(CStr::from_ptr(*ptr).to_str().unwrap(), "echo");
            assert_eq!(CStr::from_ptr(*ptr.add(1)).to_str().unwrap(), "hi");
            assert_eq!(*ptr.add(2), ptr::null());
        }
        assert_eq!(arr.len(), 2);
        let mut iter = arr.iter();
        assert_eq!(iter.next().map(|s| s.to_str().unwrap()), Some("echo"));
        assert_eq!(iter.next().map(|s| s.to_str().unwrap()), Some("hi"));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_empty_array_is_just_the_terminator() {
        let arr = OwningNullTerminatedArray::new(vec![]);
        assert!(arr.is_empty());
        unsafe {
            assert_eq!(*arr.get(), ptr::null());
        }
    }
}
