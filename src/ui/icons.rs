//! Shared UI icons, with plain-text fallbacks for terminals without emoji.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static STOP: Emoji<'_, '_> = Emoji("⏹️  ", "[STOP]");

// File indicators
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static FILE_MOD: Emoji<'_, '_> = Emoji("📝 ", "~");
pub static FILE_DEL: Emoji<'_, '_> = Emoji("🗑️  ", "-");

// Workflow indicators
pub static QUESTION: Emoji<'_, '_> = Emoji("❓ ", "[?]");
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R]");
pub static GAME: Emoji<'_, '_> = Emoji("🎮 ", "[GAME]");
