/// Shorthand way to create a `Tag::Compound`. Keys keep the order given.
/// Example:
/// ```
/// # use mcrestore::compound;
/// let chunk = compound!{
///     ("xPos", 3i32),
///     ("zPos", -2i32),
///     ("Status", "minecraft:full"),
/// };
/// assert_eq!(chunk.get("zPos").and_then(|tag| tag.as_i32()), Some(-2));
/// ```
#[macro_export]
macro_rules! compound {
    ($(($name:expr, $value:expr)),+$(,)?) => {
        $crate::nbt::Tag::Compound($crate::nbt::Map::from_iter([
            $(
                ($crate::nbt::NbtString::from($name), $crate::nbt::Tag::from($value)),
            )+
        ]))
    };
    () => {
        $crate::nbt::Tag::Compound($crate::nbt::Map::new())
    };
}

/// Shorthand way to create a `Tag::List`.
/// Example:
/// ```
/// # use mcrestore::list;
/// let heights = list![1i32, 2, 3];
/// let motion = list![0.0f64, -0.08, 0.0];
/// # let _ = (heights, motion);
/// ```
/// An empty invocation creates an untyped empty list.
#[macro_export]
macro_rules! list {
    ($($item:expr),+$(,)?) => {
        $crate::nbt::Tag::List($crate::nbt::ListTag::from(::std::vec![
            $($item,)+
        ]))
    };
    () => {
        $crate::nbt::Tag::List($crate::nbt::ListTag::Empty)
    };
}

pub use crate::{list, compound};

#[cfg(test)]
mod tests {
    use crate::nbt::{Tag, ListTag};

    #[test]
    fn compound_keeps_order() {
        let tag = compound! {
            ("zPos", 2i32),
            ("xPos", 1i32),
            ("Status", "minecraft:full"),
        };
        let keys: Vec<&str> = tag.as_compound().unwrap().keys().map(|key| key.as_str()).collect();
        assert_eq!(keys, ["zPos", "xPos", "Status"]);
        assert_eq!(tag.get("Status").and_then(Tag::as_str), Some("minecraft:full"));
    }

    #[test]
    fn list_infers_type() {
        assert_eq!(list![1i32, 2, 3], Tag::List(ListTag::Int(vec![1, 2, 3])));
        assert_eq!(list![], Tag::List(ListTag::Empty));
    }
}
