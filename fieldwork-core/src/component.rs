//! Component trait for field renderers

use std::sync::Arc;

use crate::markup::Node;

/// Callback through which a field commits a replacement value for the
/// record entry it edits.
///
/// This is the single mutation entry point: components receive their value
/// as an immutable snapshot in props and never change it in place. A commit
/// replaces the whole value for the given field id, so callers build the
/// next value by merging their patch into the current snapshot - sibling
/// keys are always carried forward.
pub type OnChange<V> = Arc<dyn Fn(&str, V) + Send + Sync>;

/// A pure field renderer.
///
/// Components follow these rules:
/// 1. Props contain ALL read-only data needed for rendering
/// 2. `render` is a pure function of props
/// 3. Data mutations go through the [`OnChange`] handle carried in props,
///    never through the component itself
///
/// Input handling is typed per field (e.g. a map field exposes
/// `handle_search_change` and `handle_map_change`) rather than funnelled
/// through a generic event parameter; each handler either fires the
/// instance's event bus or commits directly via `OnChange`.
///
/// # Example
///
/// ```ignore
/// struct RadioField;
///
/// impl Component for RadioField {
///     type Props<'a> = &'a RadioProps;
///
///     fn render(&mut self, props: Self::Props<'_>) -> Node {
///         Node::element("ul").children(
///             props.options.iter().map(|option| render_option(props, option)),
///         )
///     }
/// }
/// ```
pub trait Component {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Render the component to a markup tree
    fn render(&mut self, props: Self::Props<'_>) -> Node;
}
