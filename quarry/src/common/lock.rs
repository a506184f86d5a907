use std::sync::Arc;

use parking_lot::RwLock;

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_read_write() {
        let shared = atomic(1);
        {
            let mut guard = shared.write();
            *guard = 2;
        }
        assert_eq!(*shared.read(), 2);
    }

    #[test]
    fn test_atomic_clone_shares_state() {
        let shared = atomic(String::from("a"));
        let other = shared.clone();
        shared.write().push('b');
        assert_eq!(*other.read(), "ab");
    }
}
