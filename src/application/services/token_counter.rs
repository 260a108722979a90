use std::borrow::Cow;
use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

static TOKENIZER: LazyLock<CoreBPE> = LazyLock::new(|| {
    tiktoken_rs::cl100k_base().expect("Failed to initialize cl100k_base tokenizer")
});

/// Approximate token count used for prompt budgeting. The exact model
/// tokenizer differs, but cl100k is close enough to size requests by.
pub fn count_tokens(text: &str) -> usize {
    TOKENIZER.encode_with_special_tokens(text).len()
}

/// Cuts text down to at most `max_tokens` tokens, returning it borrowed
/// when it already fits.
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> Cow<'_, str> {
    let tokens = TOKENIZER.encode_with_special_tokens(text);
    if tokens.len() <= max_tokens {
        return Cow::Borrowed(text);
    }

    match TOKENIZER.decode(tokens[..max_tokens].to_vec()) {
        Ok(truncated) => Cow::Owned(truncated),
        // Token slice may split a multibyte sequence; fall back to a
        // rough 4-chars-per-token cut.
        Err(_) => Cow::Owned(text.chars().take(max_tokens * 4).collect()),
    }
}
