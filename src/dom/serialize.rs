use kuchiki::NodeRef;
use tracing::warn;

/// HTML for `node` and its subtree, via html5ever's serializer.
pub(super) fn to_html(node: &NodeRef) -> String {
    let mut out = Vec::new();
    if let Err(err) = node.serialize(&mut out) {
        warn!(target = "dom", error = %err, "failed to serialize node");
    }
    String::from_utf8_lossy(&out).into_owned()
}
