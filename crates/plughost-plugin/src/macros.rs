//! Convenience macros for plugin development.

/// Builds a [`HookPayload`](crate::hooks::definitions::HookPayload) from a
/// hook name and key/value pairs.
///
/// # Example
/// ```rust,ignore
/// let payload = hook_payload!("orderPaid", {
///     "order_id" => json!(42),
///     "total" => json!("19.90"),
/// });
/// ```
#[macro_export]
macro_rules! hook_payload {
    ($hook:expr) => {
        $crate::hooks::definitions::HookPayload::new($hook)
    };
    ($hook:expr, { $($key:expr => $value:expr),* $(,)? }) => {{
        let mut payload = $crate::hooks::definitions::HookPayload::new($hook);
        $(
            payload.data.insert($key.to_string(), $value);
        )*
        payload
    }};
}
