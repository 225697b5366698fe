//! Fixed texts: the tutor's system instruction, user-facing fallback
//! messages, and the quick-start prompts offered on an empty chat.
//!
//! All user-visible strings are Arabic, matching the academy UI language.

/// System instruction fixing the tutor's persona, tone, and output
/// conventions. Sent once when a conversation is created; the conversation
/// handle carries it for every subsequent turn.
pub const TUTOR_SYSTEM_INSTRUCTION: &str = r#"أنت "كوداي" (CodeAI)، المستشار التقني وكبير المهندسين في أكاديمية CodeAI.
مهامك:
1. تقديم شروحات برمجية احترافية وعميقة باللغة العربية.
2. عند كتابة كود، استخدم تنسيق Markdown مع تحديد اللغة (مثل ```python).
3. لا تكتفِ بالإجابة، بل اشرح "لماذا" تم اختيار هذا الحل.
4. استخدم الرموز التعبيرية (Emojis) بشكل مهني لتنظيم الإجابة.
5. إذا سألك طالب عن مفهوم معقد، ابدأ بتبسيطه ثم تعمق تدريجياً.
6. شجع الطالب على التفكير النقدي وطرح الأسئلة."#;

/// Fallback turn appended when the tutor gateway call fails. The raw error
/// never reaches the transcript.
pub const TUTOR_FALLBACK_MESSAGE: &str = "⚠️ حدث خطأ في النظام الذكي. يرجى المحاولة لاحقاً.";

/// Error shown by the image lab when an edit request fails.
pub const IMAGE_EDIT_FAILURE_MESSAGE: &str = "حدث خطأ أثناء معالجة الصورة. يرجى المحاولة مرة أخرى.";

/// Fixed filename for downloaded edit results.
pub const DOWNLOAD_FILENAME: &str = "edited-by-codeai.png";

/// Canned starter prompts shown on an empty chat.
pub const QUICK_PROMPTS: [&str; 4] = [
    "ممكن تشرح لي كيف تعمل الـ Decorators في بايثون؟",
    "أعطني 3 أفكار مشاريع AI للمبتدئين",
    "عندي خطأ في React، كيف أصلحه؟",
    "ما هو أفضل مسار لتعلم معالجة اللغات الطبيعية؟",
];
