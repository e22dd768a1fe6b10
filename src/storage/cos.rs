//! Tencent Cloud COS storage client
//!
//! COS speaks the S3 protocol on `https://cos.<region>.myqcloud.com`, so we use
//! aws-sdk-s3 with a custom endpoint. Buckets are addressed virtual-host style,
//! which gives object URLs of the form:
//!
//! ```text
//! https://<bucket>-<appid>.cos.<region>.myqcloud.com/<key>
//! ```

use async_trait::async_trait;
use aws_sdk_s3::{
    Client as S3Client,
    config::{BehaviorVersion, Builder, Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{NoExpand, Regex};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use super::traits::{ObjectStore, StorageError, StorageResult, StoredObject};
use crate::config::CosSettings;

/// Characters escaped in object keys; `/` separates key segments and stays as-is
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Matches the `<bucket>.cos.<region>.myqcloud.com` host of a COS object URL
static COS_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^/]+\.cos\.[^/]+\.myqcloud\.com").expect("COS host pattern is valid")
});

/// COS client bound to one bucket
#[derive(Clone)]
pub struct CosClient {
    client: S3Client,
    bucket: String,
    endpoint: Url,
}

impl CosClient {
    /// Create a new COS client from settings
    ///
    /// Credentials are not checked here; a bad key surfaces as an upload failure.
    pub fn new(settings: &CosSettings) -> StorageResult<Self> {
        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cos.{}.myqcloud.com", settings.region));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        debug!("Creating COS client with endpoint: {}", endpoint);

        let credentials = Credentials::new(
            &settings.secret_id,
            &settings.secret_key,
            None, // session token
            None, // expiry
            "cos-static-credentials",
        );

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint.as_str().trim_end_matches('/'))
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(false)
            .build();

        Ok(Self {
            client: S3Client::from_conf(config),
            bucket: settings.bucket.clone(),
            endpoint,
        })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Unsigned URL for `key`
    pub fn public_url(&self, key: &str) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        let port = self
            .endpoint
            .port()
            .map(|p| format!(":{}", p))
            .unwrap_or_default();

        format!(
            "{}://{}.{}{}/{}",
            self.endpoint.scheme(),
            self.bucket,
            host,
            port,
            utf8_percent_encode(key, KEY_ENCODE_SET)
        )
    }
}

#[async_trait]
impl ObjectStore for CosClient {
    #[instrument(skip(self, body))]
    async fn put_object(&self, key: &str, body: Vec<u8>) -> StorageResult<StoredObject> {
        let size = body.len() as u64;

        debug!("Uploading {} bytes to COS bucket {}: {}", size, self.bucket, key);

        let result = self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(describe_sdk_error(&e)))?;

        let etag = result.e_tag().map(String::from);

        info!("Uploaded to COS: {} ({} bytes)", key, size);

        Ok(StoredObject {
            key: key.to_string(),
            size,
            etag,
        })
    }

    #[instrument(skip(self))]
    async fn object_url(&self, key: &str, sign: bool, expires: Duration) -> StorageResult<String> {
        if !sign {
            return Ok(self.public_url(key));
        }

        let presigning = PresigningConfig::expires_in(expires)
            .map_err(|e| StorageError::SignFailed(e.to_string()))?;

        let request = self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::SignFailed(describe_sdk_error(&e)))?;

        debug!(expires_secs = expires.as_secs(), "Signed COS URL for {}", key);

        Ok(request.uri().to_string())
    }
}

/// Replace the COS hostname in `url` with `domain`, keeping path and query
pub fn rewrite_domain(url: &str, domain: &str) -> String {
    COS_HOST.replace(url, NoExpand(domain)).into_owned()
}

/// Prefer the service's own message over the SDK's debug dump
fn describe_sdk_error<E>(err: &aws_sdk_s3::error::SdkError<E>) -> String
where
    E: aws_sdk_s3::error::ProvideErrorMetadata + std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => match (service.code(), service.message()) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code.to_string(),
            (None, Some(message)) => message.to_string(),
            (None, None) => format!("{:?}", service),
        },
        None => err.to_string(),
    }
}

/// Content type from the key's extension
fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::valid_cos_settings;

    #[test]
    fn test_public_url_uses_virtual_host() {
        let client = CosClient::new(&valid_cos_settings()).unwrap();
        assert_eq!(client.bucket(), "notes-1250000000");
        assert_eq!(
            client.public_url("2024/03/shot 1.png"),
            "https://notes-1250000000.cos.ap-guangzhou.myqcloud.com/2024/03/shot%201.png"
        );
    }

    #[test]
    fn test_public_url_with_endpoint_override() {
        let mut settings = valid_cos_settings();
        settings.endpoint = Some("http://localhost:9000".to_string());
        let client = CosClient::new(&settings).unwrap();
        assert_eq!(
            client.public_url("a.png"),
            "http://notes-1250000000.localhost:9000/a.png"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let mut settings = valid_cos_settings();
        settings.endpoint = Some("not a url".to_string());
        assert!(matches!(
            CosClient::new(&settings),
            Err(StorageError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_rewrite_domain_keeps_path_and_query() {
        let url = "https://notes-1250000000.cos.ap-guangzhou.myqcloud.com/2024/a.png?X-Amz-Expires=3600&X-Amz-Signature=abc";
        assert_eq!(
            rewrite_domain(url, "img.example.com"),
            "https://img.example.com/2024/a.png?X-Amz-Expires=3600&X-Amz-Signature=abc"
        );
    }

    #[test]
    fn test_rewrite_domain_ignores_foreign_hosts() {
        let url = "https://example.com/a.png";
        assert_eq!(rewrite_domain(url, "img.example.com"), url);
        // `$` in the replacement is literal
        assert_eq!(
            rewrite_domain("https://b.cos.r.myqcloud.com/x", "cdn$1.example.com"),
            "https://cdn$1.example.com/x"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.PNG"), "image/png");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_signed_url_is_presigned() {
        let client = CosClient::new(&valid_cos_settings()).unwrap();
        let url = client
            .object_url("2024/a.png", true, Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("https://notes-1250000000.cos.ap-guangzhou.myqcloud.com/2024/a.png?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn test_unsigned_url_has_no_query() {
        let client = CosClient::new(&valid_cos_settings()).unwrap();
        let url = tokio_test::block_on(client.object_url("2024/a.png", false, Duration::from_secs(3600)))
            .unwrap();
        assert_eq!(url, "https://notes-1250000000.cos.ap-guangzhou.myqcloud.com/2024/a.png");
    }

    #[tokio::test]
    async fn test_signing_beyond_one_week_fails() {
        let client = CosClient::new(&valid_cos_settings()).unwrap();
        let err = client
            .object_url("2024/a.png", true, Duration::from_secs(2_592_000))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::SignFailed(_)));
    }
}
