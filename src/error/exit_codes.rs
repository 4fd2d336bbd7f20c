// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::ExtFetchError;

pub fn get_exit_code(error: &ExtFetchError) -> i32 {
    if error.is_configuration_error() {
        return 2;
    }

    match error {
        ExtFetchError::UserDeclined => 3,

        ExtFetchError::BrowserLaunch(_) => 4,

        ExtFetchError::BatchFailed { .. } => 5,

        ExtFetchError::Navigation { .. } | ExtFetchError::Download { .. } => 20,

        _ => 1,
    }
}
