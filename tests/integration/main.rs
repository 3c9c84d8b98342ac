//! Integration tests: estimator scenarios, feed comparison and the proxy
//! chain driven by a scripted transport.

mod mock_transport;
mod scenarios;
