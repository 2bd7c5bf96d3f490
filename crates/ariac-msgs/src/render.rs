//! 消息文本渲染
//!
//! 输出格式与 roscpp 的 `operator<<` 一致（缩进两格的 YAML 风格），
//! 用于把订单、关节状态等消息原样写入日志。

use std::fmt::{self, Display, Formatter};

pub(crate) trait RenderText {
    fn render(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result;
}

pub(crate) fn scalar(
    f: &mut Formatter<'_>,
    indent: usize,
    name: &str,
    value: impl Display,
) -> fmt::Result {
    writeln!(f, "{:indent$}{}: {}", "", name, value, indent = indent)
}

pub(crate) fn nested(
    f: &mut Formatter<'_>,
    indent: usize,
    name: &str,
    value: &impl RenderText,
) -> fmt::Result {
    writeln!(f, "{:indent$}{}: ", "", name, indent = indent)?;
    value.render(f, indent + 2)
}

pub(crate) fn scalars<T: Display>(
    f: &mut Formatter<'_>,
    indent: usize,
    name: &str,
    items: &[T],
) -> fmt::Result {
    writeln!(f, "{:indent$}{}[]", "", name, indent = indent)?;
    for (i, item) in items.iter().enumerate() {
        writeln!(
            f,
            "{:indent$}{}[{}]: {}",
            "",
            name,
            i,
            item,
            indent = indent + 2
        )?;
    }
    Ok(())
}

pub(crate) fn structs<T: RenderText>(
    f: &mut Formatter<'_>,
    indent: usize,
    name: &str,
    items: &[T],
) -> fmt::Result {
    writeln!(f, "{:indent$}{}[]", "", name, indent = indent)?;
    for (i, item) in items.iter().enumerate() {
        writeln!(f, "{:indent$}{}[{}]: ", "", name, i, indent = indent + 2)?;
        item.render(f, indent + 4)?;
    }
    Ok(())
}

/// 为实现了 `RenderText` 的类型生成 `Display`
macro_rules! display_via_render {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    crate::render::RenderText::render(self, f, 0)
                }
            }
        )+
    };
}

pub(crate) use display_via_render;
