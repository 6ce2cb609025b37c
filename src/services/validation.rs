// src/services/validation.rs

use validator::ValidateEmail;

/// Пустая строка или одни пробелы
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Проверка адреса почты: ровно один mailbox, без display name,
/// без пробелов по краям — разобранный адрес должен совпадать с вводом
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.trim() != email {
        return false;
    }

    // списки адресов и формы вида `Name <a@b.com>`
    if email.contains([',', ';', '<', '>']) {
        return false;
    }

    email.validate_email()
}
