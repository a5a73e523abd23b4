use axum::extract::Multipart;
use bytes::Bytes;

use super::repo_types::UserError;

/// Multipart field carrying the optional profile picture.
pub const PROFILE_PICTURE_FIELD: &str = "profilePicture";

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub body: Bytes,
}

/// Fields of `POST /users` as they arrive; every one may be absent.
#[derive(Debug, Default)]
pub struct CreateUserForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<UploadedFile>,
}

/// The three required text fields, all present and non-empty.
#[derive(Debug)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserForm {
    /// Drains a multipart body. Accepts at most one file, and only under
    /// `profilePicture`; unknown text fields are ignored.
    pub async fn read(mp: &mut Multipart) -> anyhow::Result<Self> {
        let mut form = Self::default();
        while let Some(field) = mp.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name().map(str::to_string) {
                anyhow::ensure!(
                    name == PROFILE_PICTURE_FIELD,
                    "unexpected file field {name:?}"
                );
                anyhow::ensure!(
                    form.profile_picture.is_none(),
                    "more than one {PROFILE_PICTURE_FIELD} file"
                );
                let body = field.bytes().await?;
                // Browsers send an empty, nameless part when no file was picked.
                if file_name.is_empty() && body.is_empty() {
                    continue;
                }
                form.profile_picture = Some(UploadedFile { file_name, body });
                continue;
            }

            let slot = match name.as_str() {
                "name" => &mut form.name,
                "email" => &mut form.email,
                "password" => &mut form.password,
                _ => continue,
            };
            *slot = Some(field.text().await?);
        }
        Ok(form)
    }

    /// Splits off the required fields, leaving the upload in place.
    pub fn take_credentials(&mut self) -> Result<Credentials, UserError> {
        fn required(v: Option<String>, field: &'static str) -> Result<String, UserError> {
            v.filter(|s| !s.is_empty()).ok_or(UserError::MissingField(field))
        }
        Ok(Credentials {
            name: required(self.name.take(), "name")?,
            email: required(self.email.take(), "email")?,
            password: required(self.password.take(), "password")?,
        })
    }
}
