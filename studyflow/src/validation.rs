//! Form checks run before any request is sent

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::api::{LoginRequest, QuizOptions, RegisterRequest};

/// Characters accepted as the special character of a password
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Phrase that confirms account deletion
pub const DELETE_CONFIRMATION: &str = "삭제";

static HEX_COLOR: OnceLock<Regex> = OnceLock::new();

fn hex_color() -> &'static Regex {
    HEX_COLOR.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex"))
}

/// A rejected form field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("아이디를 입력해주세요.")]
    LoginIdRequired,

    #[error("아이디는 4자 이상이어야 합니다.")]
    LoginIdTooShort,

    #[error("비밀번호를 입력해주세요.")]
    PasswordRequired,

    #[error("비밀번호는 최소 {min}자 이상이어야 합니다.")]
    PasswordTooShort { min: usize },

    #[error("비밀번호는 영문 대문자, 소문자, 숫자, 특수문자를 모두 포함해야 합니다.")]
    PasswordTooWeak,

    #[error("비밀번호가 일치하지 않습니다.")]
    PasswordMismatch,

    #[error("새 비밀번호가 일치하지 않습니다.")]
    NewPasswordMismatch,

    #[error("사용자명을 입력해주세요.")]
    UsernameRequired,

    #[error("학교를 입력해주세요.")]
    SchoolRequired,

    #[error("학과를 입력해주세요.")]
    MajorRequired,

    #[error("학년을 1~4 사이의 숫자로 입력해주세요.")]
    GradeOutOfRange,

    #[error("정확히 \"삭제\"라고 입력해주세요.")]
    DeleteNotConfirmed,

    #[error("최소 한 개의 주차를 선택해주세요.")]
    NoWeeksSelected,

    #[error("최소 한 가지 문제 유형을 선택해주세요.")]
    NoQuestionTypes,

    #[error("문제 개수는 1개 이상이어야 합니다.")]
    NoQuestions,

    #[error("시험 범위의 시작 주차가 종료 주차보다 늦습니다.")]
    ExamRangeReversed,

    #[error("색상은 #RRGGBB 형식이어야 합니다: {0}")]
    InvalidColor(String),
}

/// Which character classes a password contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordChecks {
    pub has_upper: bool,
    pub has_lower: bool,
    pub has_digit: bool,
    pub has_special: bool,
}

impl PasswordChecks {
    pub fn of(password: &str) -> Self {
        Self {
            has_upper: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lower: password.chars().any(|c| c.is_ascii_lowercase()),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_special: password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
        }
    }

    pub fn all(&self) -> bool {
        self.has_upper && self.has_lower && self.has_digit && self.has_special
    }
}

/// Sign-up form as typed by the user
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub login_id: String,
    pub password: String,
    pub password_confirm: String,
    pub username: String,
    pub school: String,
    pub major: String,
    pub grade: String,
}

impl SignUpForm {
    /// Check every field in display order and build the request
    ///
    /// The first failing rule is reported.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let login_id = self.login_id.trim();
        if login_id.is_empty() {
            return Err(ValidationError::LoginIdRequired);
        }
        if self.login_id.chars().count() < 4 {
            return Err(ValidationError::LoginIdTooShort);
        }

        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        if self.password.chars().count() < 8 {
            return Err(ValidationError::PasswordTooShort { min: 8 });
        }
        if !PasswordChecks::of(&self.password).all() {
            return Err(ValidationError::PasswordTooWeak);
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        let username = self.username.trim();
        if username.is_empty() {
            return Err(ValidationError::UsernameRequired);
        }
        let school = self.school.trim();
        if school.is_empty() {
            return Err(ValidationError::SchoolRequired);
        }
        let major = self.major.trim();
        if major.is_empty() {
            return Err(ValidationError::MajorRequired);
        }

        let grade = parse_grade(&self.grade).ok_or(ValidationError::GradeOutOfRange)?;

        Ok(RegisterRequest {
            login_id: login_id.to_string(),
            password: self.password.clone(),
            username: username.to_string(),
            school: school.to_string(),
            major: major.to_string(),
            grade,
        })
    }
}

fn parse_grade(raw: &str) -> Option<u8> {
    let grade: u8 = raw.trim().parse().ok()?;
    (1..=4).contains(&grade).then_some(grade)
}

/// Login form check; the id is trimmed, the password is sent as typed
pub fn validate_login(login_id: &str, password: &str) -> Result<LoginRequest, ValidationError> {
    let login_id = login_id.trim();
    if login_id.is_empty() {
        return Err(ValidationError::LoginIdRequired);
    }
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }

    Ok(LoginRequest {
        login_id: login_id.to_string(),
        password: password.to_string(),
    })
}

/// Password change check (settings page)
pub fn validate_password_change(new_password: &str, confirm: &str) -> Result<(), ValidationError> {
    if new_password != confirm {
        return Err(ValidationError::NewPasswordMismatch);
    }
    if new_password.chars().count() < 6 {
        return Err(ValidationError::PasswordTooShort { min: 6 });
    }
    Ok(())
}

/// The deletion dialog accepts only the exact phrase
pub fn validate_delete_confirmation(typed: &str) -> Result<(), ValidationError> {
    if typed == DELETE_CONFIRMATION {
        Ok(())
    } else {
        Err(ValidationError::DeleteNotConfirmed)
    }
}

/// Quiz creation dialog check
pub fn validate_quiz_options(options: &QuizOptions) -> Result<(), ValidationError> {
    if options.week_numbers.is_empty() {
        return Err(ValidationError::NoWeeksSelected);
    }
    if options.question_types.is_empty() {
        return Err(ValidationError::NoQuestionTypes);
    }
    if options.num_questions < 1 {
        return Err(ValidationError::NoQuestions);
    }
    Ok(())
}

/// Exam range check; open-ended ranges are accepted
pub fn validate_exam_range(start: Option<u32>, end: Option<u32>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(ValidationError::ExamRangeReversed),
        _ => Ok(()),
    }
}

/// Subject colours are `#RRGGBB`
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if hex_color().is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Difficulty, QuestionType, QuizLanguage};

    fn valid_form() -> SignUpForm {
        SignUpForm {
            login_id: "  minji  ".to_string(),
            password: "Abcdef1!".to_string(),
            password_confirm: "Abcdef1!".to_string(),
            username: " 민지 ".to_string(),
            school: "한국대학교".to_string(),
            major: "컴퓨터공학".to_string(),
            grade: "2".to_string(),
        }
    }

    #[test]
    fn test_valid_signup_is_trimmed() {
        let request = valid_form().validate().unwrap();
        assert_eq!(request.login_id, "minji");
        assert_eq!(request.username, "민지");
        assert_eq!(request.grade, 2);
    }

    #[test]
    fn test_signup_rules_in_order() {
        let cases: [(fn(&mut SignUpForm), ValidationError); 11] = [
            (|f| f.login_id = " ".to_string(), ValidationError::LoginIdRequired),
            (|f| f.login_id = "abc".to_string(), ValidationError::LoginIdTooShort),
            (|f| f.password.clear(), ValidationError::PasswordRequired),
            (
                |f| f.password = "Ab1!".to_string(),
                ValidationError::PasswordTooShort { min: 8 },
            ),
            (
                |f| f.password = "abcdefg1!".to_string(),
                ValidationError::PasswordTooWeak,
            ),
            (
                |f| f.password_confirm = "Abcdef1?".to_string(),
                ValidationError::PasswordMismatch,
            ),
            (|f| f.username.clear(), ValidationError::UsernameRequired),
            (|f| f.school = "  ".to_string(), ValidationError::SchoolRequired),
            (|f| f.major.clear(), ValidationError::MajorRequired),
            (|f| f.grade = "5".to_string(), ValidationError::GradeOutOfRange),
            (|f| f.grade = "".to_string(), ValidationError::GradeOutOfRange),
        ];

        for (mutate, expected) in cases {
            let mut form = valid_form();
            mutate(&mut form);
            assert_eq!(form.validate().unwrap_err(), expected);
        }
    }

    #[test]
    fn test_password_checks() {
        let checks = PasswordChecks::of("abcD3{");
        assert!(checks.all());
        assert!(!PasswordChecks::of("abcD3_").has_special);
    }

    #[test]
    fn test_login_validation() {
        assert_eq!(
            validate_login("  ", "x").unwrap_err(),
            ValidationError::LoginIdRequired
        );
        assert_eq!(
            validate_login("id", "").unwrap_err(),
            ValidationError::PasswordRequired
        );
        assert_eq!(validate_login(" id ", " p ").unwrap().password, " p ");
    }

    #[test]
    fn test_password_change() {
        assert_eq!(
            validate_password_change("abcdef", "abcdeg"),
            Err(ValidationError::NewPasswordMismatch)
        );
        assert_eq!(
            validate_password_change("abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert!(validate_password_change("abcdef", "abcdef").is_ok());
    }

    #[test]
    fn test_delete_confirmation_is_exact() {
        assert!(validate_delete_confirmation("삭제").is_ok());
        assert!(validate_delete_confirmation(" 삭제").is_err());
    }

    #[test]
    fn test_quiz_options() {
        let mut options = QuizOptions {
            week_numbers: vec![1],
            difficulty: Difficulty::Easy,
            question_types: vec![QuestionType::ShortAnswer],
            language: QuizLanguage::Korean,
            num_questions: 1,
            past_exam_context: None,
        };
        assert!(validate_quiz_options(&options).is_ok());

        options.num_questions = 0;
        assert_eq!(
            validate_quiz_options(&options),
            Err(ValidationError::NoQuestions)
        );

        options.question_types.clear();
        assert_eq!(
            validate_quiz_options(&options),
            Err(ValidationError::NoQuestionTypes)
        );

        options.week_numbers.clear();
        assert_eq!(
            validate_quiz_options(&options),
            Err(ValidationError::NoWeeksSelected)
        );
    }

    #[test]
    fn test_exam_range_and_color() {
        assert!(validate_exam_range(Some(3), Some(8)).is_ok());
        assert!(validate_exam_range(Some(9), None).is_ok());
        assert_eq!(
            validate_exam_range(Some(9), Some(8)),
            Err(ValidationError::ExamRangeReversed)
        );

        assert!(validate_color("#A8d5E2").is_ok());
        assert!(validate_color("A8D5E2").is_err());
        assert!(validate_color("#A8D5E").is_err());
    }
}
