//! A variant of flog for use after fork(), in the child.
//!
//! Nothing here allocates or takes locks; values are formatted into stack
//! buffers and written directly with libc::write.

use std::ffi::CStr;
use std::mem::MaybeUninit;

/// The buffer type used for formatting an integer as a byte string.
/// 24 bytes is enough for any i64.
type StackBuffer = MaybeUninit<[u8; 24]>;

fn format_int(buff: &mut StackBuffer, mut val: u64, neg: bool) -> &[u8] {
    if val == 0 {
        return b"0";
    }
    let buff: &mut [u8; 24] = buff.write([0; 24]);
    // Fill from the end of the buffer to avoid reversing it.
    let mut cursor = buff.len();
    while val != 0 && cursor > 1 {
        buff[cursor - 1] = b'0' + (val % 10) as u8;
        val /= 10;
        cursor -= 1;
    }
    if neg {
        buff[cursor - 1] = b'-';
        cursor -= 1;
    }
    &buff[cursor..]
}

/// Formatting for the types flog_safe! accepts. Implementations must not
/// panic or allocate.
pub trait FloggableDisplayAsyncSafe {
    fn to_flog_str_async_safe<'a>(&'a self, storage: &'a mut StackBuffer) -> &'a [u8];
}

impl FloggableDisplayAsyncSafe for &str {
    fn to_flog_str_async_safe(&self, _storage: &mut StackBuffer) -> &[u8] {
        self.as_bytes()
    }
}

impl FloggableDisplayAsyncSafe for &CStr {
    fn to_flog_str_async_safe(&self, _storage: &mut StackBuffer) -> &[u8] {
        self.to_bytes()
    }
}

impl FloggableDisplayAsyncSafe for i32 {
    fn to_flog_str_async_safe<'a>(&'a self, storage: &'a mut StackBuffer) -> &'a [u8] {
        format_int(storage, u64::from(self.unsigned_abs()), *self < 0)
    }
}

/// Write one value to `fd`. Deliberately no retry on short writes or
/// signals; this only reports error messages from a child that is about to
/// _exit.
pub fn flog_impl_async_safe(fd: i32, s: impl FloggableDisplayAsyncSafe) {
    if fd < 0 {
        return;
    }
    let mut storage = StackBuffer::uninit();
    let bytes: &[u8] = s.to_flog_str_async_safe(&mut storage);
    unsafe {
        let _ = libc::write(fd, bytes.as_ptr() as *const libc::c_void, bytes.len());
    }
}

/// Variant of flog! which is async-safe to use after fork(). The arguments
/// are NOT space-separated; embed real spaces in the literals.
macro_rules! flog_safe {
    ($category:ident, $($elem:expr),+ $(,)?) => {
        if $crate::flog::categories::$category
            .enabled
            .load(std::sync::atomic::Ordering::Relaxed)
        {
            #[allow(unused_imports)]
            use $crate::fork_exec::flog_safe::{flog_impl_async_safe, FloggableDisplayAsyncSafe};
            let fd = $crate::flog::get_flog_file_fd();
            flog_impl_async_safe(fd, stringify!($category));
            flog_impl_async_safe(fd, ": ");
            $(
                flog_impl_async_safe(fd, $elem);
            )+
            flog_impl_async_safe(fd, "\n");
        }
    };
}

pub(crate) use flog_safe;

#[cfg(test)]
mod tests {
    use super::*;

    fn check(val: i32) {
        let mut storage = StackBuffer::uninit();
        let bytes = val.to_flog_str_async_safe(&mut storage);
        assert_eq!(bytes, val.to_string().as_bytes());
    }

    #[test]
    fn test_int_to_flog_str() {
        for x in -1024..=1024 {
            check(x);
        }
        check(i32::MIN);
        check(i32::MAX);
    }

    #[test]
    fn test_str_to_flog_str() {
        let mut storage = StackBuffer::uninit();
        assert_eq!("hello".to_flog_str_async_safe(&mut storage), b"hello");
        let cstr = CStr::from_bytes_with_nul(b"sleep\0").unwrap();
        assert_eq!(cstr.to_flog_str_async_safe(&mut storage), b"sleep");
    }
}
