use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{tracing, Error, LambdaEvent};

use crate::form::FormFields;

/// Decodes the proxied form body, logs the `Id` and `Name` fields and echoes
/// them back. A body that does not decode answers 400; a missing field is not
/// an error and reads as the empty string.
pub(crate) async fn function_handler(
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let body = event.payload.body.unwrap_or_default();

    // The runtime cannot return a response and an error for the same
    // invocation, so the decode error goes to the log and the caller
    // gets the 400.
    let fields = match FormFields::parse(&body) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::error!("error parsing form data: {err:#}");
            return Ok(ApiGatewayProxyResponse {
                status_code: 400,
                ..Default::default()
            });
        }
    };

    let id = fields.get("Id");
    let name = fields.get("Name");

    tracing::info!("received Id: {id}");
    tracing::info!("received Name: {name}");

    Ok(ApiGatewayProxyResponse {
        status_code: 200,
        body: Some(Body::Text(format!("Id: {id}, Name: {name}"))),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;

    async fn invoke(body: Option<&str>) -> ApiGatewayProxyResponse {
        let request = ApiGatewayProxyRequest {
            body: body.map(str::to_string),
            ..Default::default()
        };
        function_handler(LambdaEvent::new(request, Context::default()))
            .await
            .unwrap()
    }

    fn body_text(response: &ApiGatewayProxyResponse) -> &str {
        match response.body.as_ref() {
            Some(Body::Text(text)) => text,
            other => panic!("expected text body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn echoes_both_fields() {
        let response = invoke(Some("Id=42&Name=Alice")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: 42, Name: Alice");
    }

    #[tokio::test]
    async fn missing_field_is_an_empty_slot() {
        let response = invoke(Some("Name=Bob")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: , Name: Bob");
    }

    #[tokio::test]
    async fn empty_body_answers_with_empty_slots() {
        let response = invoke(Some("")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: , Name: ");
    }

    #[tokio::test]
    async fn absent_body_is_treated_as_empty() {
        let response = invoke(None).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: , Name: ");
    }

    #[tokio::test]
    async fn malformed_body_answers_400() {
        let response = invoke(Some("Id=%zz")).await;
        assert_eq!(response.status_code, 400);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn repeated_id_uses_the_first_value() {
        let response = invoke(Some("Id=1&Id=2")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: 1, Name: ");
    }

    #[tokio::test]
    async fn field_keys_are_case_sensitive() {
        let response = invoke(Some("id=1&name=x")).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "Id: , Name: ");
    }

    #[tokio::test]
    async fn request_deserializes_from_proxy_event_json() {
        let request: ApiGatewayProxyRequest =
            serde_json::from_str(r#"{"httpMethod": "POST", "body": "Id=7&Name=Eve"}"#).unwrap();
        let response = function_handler(LambdaEvent::new(request, Context::default()))
            .await
            .unwrap();
        assert_eq!(body_text(&response), "Id: 7, Name: Eve");
    }
}
