/// Subject and HTML body of the account confirmation email.
pub fn confirmation_email(confirmation_url: &str, ttl_hours: i64) -> (String, String) {
    let subject = "Confirma tu cuenta en CrackSchool".to_string();
    let html = format!(
        r#"<html>
    <body>
        <h2>¡Bienvenido a CrackSchool!</h2>
        <p>Gracias por registrarte. Por favor, haz clic en el siguiente enlace para activar tu cuenta:</p>
        <p><a href="{confirmation_url}" target="_blank">Confirmar mi cuenta</a></p>
        <p>Si no te registraste en CrackSchool, puedes ignorar este correo.</p>
        <p>Este enlace expirará en {ttl_hours} horas.</p>
        <br>
        <p>Saludos,</p>
        <p>El equipo de CrackSchool</p>
    </body>
</html>"#
    );
    (subject, html)
}
