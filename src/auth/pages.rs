use crate::error::TokenFailure;

/// HTML shown when a confirmation link cannot be redeemed.
pub fn confirmation_error_page(failure: TokenFailure) -> String {
    let reason = match failure {
        TokenFailure::Invalid => "El enlace de confirmación no es válido o ya fue utilizado.",
        TokenFailure::Expired => "El enlace de confirmación ha expirado.",
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
    <head>
        <meta charset="utf-8">
        <title>Error de confirmación - CrackSchool</title>
    </head>
    <body>
        <h2>No pudimos confirmar tu cuenta</h2>
        <p>{reason}</p>
        <p>Vuelve a registrarte para recibir un nuevo enlace de confirmación.</p>
    </body>
</html>"#
    )
}
